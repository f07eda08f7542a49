//! Matrix-free two-point flux stencil.

use ndarray::{Array1, Array3, ArrayView3, ArrayViewMut3, Zip};

use solvers::LinearOperator;

use crate::boundary::{harmonic_face, BoundarySet};
use crate::fields::{view3, view3_mut};
use crate::grid::Grid3D;

/// Seven-point stencil with precomputed face coefficients.
///
/// `apply` computes `r[c] = sum_faces f * (x_n - x_c)` where `x_n` is the
/// neighbour or ghost value. With fixed-value boundaries the operator is
/// negative definite; with all faces periodic it is symmetric with the
/// constant field in its kernel.
pub struct FvOperator {
    grid: Grid3D,
    /// Face coefficient tables, one per axis; `face[a]` is one cell longer
    /// along axis `a` so both boundary faces are stored.
    face: [Array3<f64>; 3],
    bc: BoundarySet,
}

impl FvOperator {
    pub fn new(grid: Grid3D, cond: &Array3<f64>, bc: BoundarySet) -> Self {
        let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
        let shapes = [(nx + 1, ny, nz), (nx, ny + 1, nz), (nx, ny, nz + 1)];
        let face = std::array::from_fn(|a| {
            let n = grid.dims()[a];
            Array3::from_shape_fn(shapes[a], |(fi, fj, fk)| {
                let f = [fi, fj, fk];
                let pos = f[a];
                let mut minus = f;
                let plus = f;
                if pos == 0 {
                    let inside = cond[plus];
                    let mut g = [plus[0] as isize, plus[1] as isize, plus[2] as isize];
                    g[a] = -1;
                    bc[a][0].face_conductivity(cond.view(), inside, g[0], g[1], g[2])
                } else if pos == n {
                    minus = shift(minus, a, -1);
                    let inside = cond[minus];
                    let mut g = [minus[0] as isize, minus[1] as isize, minus[2] as isize];
                    g[a] = n as isize;
                    bc[a][1].face_conductivity(cond.view(), inside, g[0], g[1], g[2])
                } else {
                    minus = shift(minus, a, -1);
                    harmonic_face(cond[minus], cond[plus])
                }
            })
        });
        Self { grid, face, bc }
    }

    pub fn grid(&self) -> Grid3D {
        self.grid
    }

    /// Apply the stencil to a 3D field.
    pub fn apply_field(&self, x: ArrayView3<'_, f64>, mut out: ArrayViewMut3<'_, f64>) {
        let (nx, ny, nz) = (self.grid.nx, self.grid.ny, self.grid.nz);
        let n = [nx, ny, nz];
        Zip::indexed(&mut out).par_for_each(|(i, j, k), o| {
            let c = x[[i, j, k]];
            let cell = [i, j, k];
            let mut acc = 0.0;
            for a in 0..3 {
                // minus face
                let f = self.face[a][(cell[0], cell[1], cell[2])];
                let xn = if cell[a] > 0 {
                    x[shift([i, j, k], a, -1)]
                } else {
                    let mut g = [i as isize, j as isize, k as isize];
                    g[a] = -1;
                    self.bc[a][0].value_at(x, g[0], g[1], g[2])
                };
                acc += f * (xn - c);
                // plus face
                let mut pf = cell;
                pf[a] += 1;
                let f = self.face[a][(pf[0], pf[1], pf[2])];
                let xn = if cell[a] + 1 < n[a] {
                    x[shift([i, j, k], a, 1)]
                } else {
                    let mut g = [i as isize, j as isize, k as isize];
                    g[a] = n[a] as isize;
                    self.bc[a][1].value_at(x, g[0], g[1], g[2])
                };
                acc += f * (xn - c);
            }
            *o = acc;
        });
    }

    /// Volume-averaged flux density per axis for a temperature field, with
    /// ghost values from this operator's boundary conditions. Component `a`
    /// is the mean over cells of the half-sum of the cell's two face fluxes
    /// along `a`, each `g = (2 f / h) (T_plus - T_minus)`.
    pub fn face_flux_mean(&self, t: ArrayView3<'_, f64>) -> [f64; 3] {
        let (nx, ny, nz) = (self.grid.nx, self.grid.ny, self.grid.nz);
        let n = [nx, ny, nz];
        let h = self.grid.h;
        let cells = self.grid.len() as f64;
        let mut mean = [0.0f64; 3];
        for a in 0..3 {
            let mut sum = 0.0;
            for i in 0..nx {
                for j in 0..ny {
                    for k in 0..nz {
                        let cell = [i, j, k];
                        let c = t[[i, j, k]];
                        let f_m = self.face[a][(cell[0], cell[1], cell[2])];
                        let t_m = if cell[a] > 0 {
                            t[shift([i, j, k], a, -1)]
                        } else {
                            let mut g = [i as isize, j as isize, k as isize];
                            g[a] = -1;
                            self.bc[a][0].value_at(t, g[0], g[1], g[2])
                        };
                        let mut pf = cell;
                        pf[a] += 1;
                        let f_p = self.face[a][(pf[0], pf[1], pf[2])];
                        let t_p = if cell[a] + 1 < n[a] {
                            t[shift([i, j, k], a, 1)]
                        } else {
                            let mut g = [i as isize, j as isize, k as isize];
                            g[a] = n[a] as isize;
                            self.bc[a][1].value_at(t, g[0], g[1], g[2])
                        };
                        let g_minus = (2.0 * f_m / h) * (c - t_m);
                        let g_plus = (2.0 * f_p / h) * (t_p - c);
                        sum += 0.5 * (g_minus + g_plus);
                    }
                }
            }
            mean[a] = sum / cells;
        }
        mean
    }
}

#[inline]
fn shift(cell: [usize; 3], axis: usize, by: isize) -> [usize; 3] {
    let mut c = [cell[0] as isize, cell[1] as isize, cell[2] as isize];
    c[axis] += by;
    [c[0] as usize, c[1] as usize, c[2] as usize]
}

impl LinearOperator for FvOperator {
    fn len(&self) -> usize {
        self.grid.len()
    }

    fn apply_into(&self, x: &Array1<f64>, out: &mut Array1<f64>) {
        self.apply_field(view3(&self.grid, x), view3_mut(&self.grid, out));
    }
}
