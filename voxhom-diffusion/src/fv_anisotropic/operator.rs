//! Matrix-free multi-point flux operator.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use solvers::LinearOperator;

use super::stencil::{octant_subface, vertex_matrix, OCTANTS, SUBFACES};
use crate::config::{Method, SideBc};
use crate::grid::{mirror_index, wrap_index, Grid3D};
use crate::materials::SymTensor3;

/// Resolved octant cell: the in-range cell it maps to, plus the affine
/// relation of the ghost temperature to the stored one,
/// `T_ghost = scale * T[cell] + offset`. The homogeneous operator drops the
/// offset.
#[derive(Debug, Clone, Copy)]
struct GhostRef {
    cell: usize,
    scale: f64,
    offset: f64,
}

struct VertexStencil {
    /// 12 x 8 flux matrix, row-major.
    e: [f64; SUBFACES * OCTANTS],
    refs: [GhostRef; OCTANTS],
}

/// Multi-point flux stencil over the whole grid.
///
/// Fixed temperatures on the two solve-axis faces enter through mirrored
/// ghost cells (`T_ghost = 2 v - T_in`); the side faces wrap periodically or
/// mirror with the tensor reflected, depending on the configured side
/// condition. `apply` is the homogeneous part; the inhomogeneous boundary
/// content comes in through [`residual_affine`](MpfaOperator::residual_affine).
pub struct MpfaOperator {
    grid: Grid3D,
    verts: Vec<VertexStencil>,
}

impl MpfaOperator {
    /// Assemble the per-vertex stencils. `low` and `high` hold the fixed
    /// temperatures on the two faces normal to `axis`, indexed by the cross
    /// axes in increasing order.
    pub fn new(
        grid: Grid3D,
        tensors: &[SymTensor3],
        axis: usize,
        side_bc: SideBc,
        method: Method,
        low: &Array2<f64>,
        high: &Array2<f64>,
    ) -> Self {
        let n = grid.dims();
        let nv = [n[0] + 1, n[1] + 1, n[2] + 1];
        let singular = AtomicUsize::new(0);

        let verts: Vec<VertexStencil> = (0..nv[0] * nv[1] * nv[2])
            .into_par_iter()
            .map(|v| {
                let vk = v % nv[2];
                let vj = (v / nv[2]) % nv[1];
                let vi = v / (nv[2] * nv[1]);
                let mut refs = [GhostRef {
                    cell: 0,
                    scale: 0.0,
                    offset: 0.0,
                }; OCTANTS];
                let mut k8 = [SymTensor3::default(); OCTANTS];
                for sx in 0..2 {
                    for sy in 0..2 {
                        for sz in 0..2 {
                            let oct = sx * 4 + sy * 2 + sz;
                            let c = [
                                vi as isize - 1 + sx as isize,
                                vj as isize - 1 + sy as isize,
                                vk as isize - 1 + sz as isize,
                            ];
                            let (r, k) = resolve(grid, tensors, axis, side_bc, low, high, c);
                            refs[oct] = r;
                            k8[oct] = k;
                        }
                    }
                }
                let e = match vertex_matrix(&k8, grid.h, method) {
                    Some(e) => e,
                    None => {
                        singular.fetch_add(1, Ordering::Relaxed);
                        [0.0; SUBFACES * OCTANTS]
                    }
                };
                VertexStencil { e, refs }
            })
            .collect();

        let dropped = singular.into_inner();
        if dropped > 0 {
            log::warn!(
                "{} of {} vertex stencils were singular and carry no flux",
                dropped,
                verts.len()
            );
        }
        Self { grid, verts }
    }

    fn vertex_fluxes(&self, x: &Array1<f64>, with_offset: bool) -> Vec<f64> {
        let mut vflux = vec![0.0; self.verts.len() * SUBFACES];
        vflux
            .par_chunks_exact_mut(SUBFACES)
            .zip(self.verts.par_iter())
            .for_each(|(out, vs)| {
                let mut t8 = [0.0f64; OCTANTS];
                for (t, r) in t8.iter_mut().zip(vs.refs.iter()) {
                    *t = r.scale * x[r.cell];
                    if with_offset {
                        *t += r.offset;
                    }
                }
                for (j, o) in out.iter_mut().enumerate() {
                    let row = &vs.e[j * OCTANTS..(j + 1) * OCTANTS];
                    *o = row.iter().zip(t8.iter()).map(|(a, b)| a * b).sum();
                }
            });
        vflux
    }

    fn residual_from(&self, vflux: &[f64], out: &mut Array1<f64>) {
        let n = self.grid.dims();
        let nv = [n[0] + 1, n[1] + 1, n[2] + 1];
        let grid = self.grid;
        let quarter_area = 0.25 * grid.h * grid.h;
        let outs = out.as_slice_mut().expect("residual is contiguous");
        outs.par_iter_mut().enumerate().for_each(|(c, o)| {
            let (i, j, k) = grid.coords(c);
            let mut acc = 0.0;
            for vx in 0..2 {
                for vy in 0..2 {
                    for vz in 0..2 {
                        let v = (((i + vx) * nv[1]) + (j + vy)) * nv[2] + (k + vz);
                        // the cell sits in the octant opposite the corner
                        let s = [1 - vx, 1 - vy, 1 - vz];
                        for a in 0..3 {
                            let sigma = 2.0 * s[a] as f64 - 1.0;
                            acc += sigma * vflux[v * SUBFACES + octant_subface(s, a)];
                        }
                    }
                }
            }
            *o = acc * quarter_area;
        });
    }

    /// Residual of the full temperature field, boundary values included.
    /// The right-hand side of the homogeneous solve is its negation at the
    /// affine profile.
    pub fn residual_affine(&self, t: &Array1<f64>) -> Array1<f64> {
        let vflux = self.vertex_fluxes(t, true);
        let mut out = Array1::zeros(self.grid.len());
        self.residual_from(&vflux, &mut out);
        out
    }

    /// Per-cell flux density `q = -K grad T`, averaged over the eight
    /// sub-flux estimates at the cell corners.
    pub fn flux_field(&self, t: &Array1<f64>) -> Vec<[f64; 3]> {
        let vflux = self.vertex_fluxes(t, true);
        let n = self.grid.dims();
        let nv = [n[0] + 1, n[1] + 1, n[2] + 1];
        let grid = self.grid;
        (0..grid.len())
            .into_par_iter()
            .map(|c| {
                let (i, j, k) = grid.coords(c);
                let mut q = [0.0f64; 3];
                for vx in 0..2 {
                    for vy in 0..2 {
                        for vz in 0..2 {
                            let v = (((i + vx) * nv[1]) + (j + vy)) * nv[2] + (k + vz);
                            let s = [1 - vx, 1 - vy, 1 - vz];
                            for (a, qa) in q.iter_mut().enumerate() {
                                *qa += vflux[v * SUBFACES + octant_subface(s, a)];
                            }
                        }
                    }
                }
                [q[0] / 8.0, q[1] / 8.0, q[2] / 8.0]
            })
            .collect()
    }
}

impl LinearOperator for MpfaOperator {
    fn len(&self) -> usize {
        self.grid.len()
    }

    fn apply_into(&self, x: &Array1<f64>, out: &mut Array1<f64>) {
        let vflux = self.vertex_fluxes(x, false);
        self.residual_from(&vflux, out);
    }
}

/// Map an octant cell to an in-range cell with the ghost relation for its
/// temperature and the tensor it carries. Cross axes resolve first so the
/// solve-axis face value is read at in-range cross coordinates.
fn resolve(
    grid: Grid3D,
    tensors: &[SymTensor3],
    axis: usize,
    side_bc: SideBc,
    low: &Array2<f64>,
    high: &Array2<f64>,
    mut c: [isize; 3],
) -> (GhostRef, SymTensor3) {
    let n = grid.dims();
    let mut scale = 1.0;
    let mut offset = 0.0;
    let mut reflect = [false; 3];

    for d in 0..3 {
        if d == axis || (c[d] >= 0 && (c[d] as usize) < n[d]) {
            continue;
        }
        match side_bc {
            SideBc::Periodic => c[d] = wrap_index(n[d], c[d]) as isize,
            SideBc::Symmetric => {
                c[d] = mirror_index(n[d], c[d]) as isize;
                reflect[d] = !reflect[d];
            }
        }
    }

    if c[axis] < 0 || (c[axis] as usize) >= n[axis] {
        let (c1, c2) = super::stencil::cross_axes(axis);
        let face = if c[axis] < 0 { low } else { high };
        let v = face[[c[c1] as usize, c[c2] as usize]];
        c[axis] = mirror_index(n[axis], c[axis]) as isize;
        scale = -scale;
        offset = 2.0 * v - offset;
        reflect[axis] = !reflect[axis];
    }

    let cell = grid.idx(c[0] as usize, c[1] as usize, c[2] as usize);
    let mut k = tensors[cell];
    for (d, &r) in reflect.iter().enumerate() {
        if r {
            k = k.reflected(d);
        }
    }
    (GhostRef { cell, scale, offset }, k)
}
