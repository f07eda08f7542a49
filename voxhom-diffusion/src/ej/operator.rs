//! Interface-jump operator.

use ndarray::{Array1, Array3};
use rayon::prelude::*;

use solvers::LinearOperator;

use super::poisson::PoissonSolver;
use crate::grid::Grid3D;

/// One material interface: the two adjacent cells (periodic neighbours along
/// the face normal) and the conductivity contrast
/// `b = (k_front - k_back) / (k_front + k_back)`.
#[derive(Debug, Clone, Copy)]
pub struct Interface {
    pub back: usize,
    pub front: usize,
    pub b: f64,
}

/// Matrix-free operator on the jump vector `J`.
///
/// `apply` computes `J + (2 b / h) (u_front - u_back)` where
/// `u = laplacian^-1 (scatter(J))`. The jump vector is ordered by interface
/// normal axis, x block first.
pub struct EjOperator {
    grid: Grid3D,
    poisson: PoissonSolver,
    interfaces: [Vec<Interface>; 3],
    len: usize,
}

impl EjOperator {
    /// Collect the interfaces of a scalar conductivity field. A face is an
    /// interface when its two cells carry different conductivities.
    pub fn new(grid: Grid3D, cond: &Array3<f64>) -> Self {
        let n = grid.dims();
        // ordered collect keeps each block in cell-index order
        let interfaces: [Vec<Interface>; 3] = std::array::from_fn(|a| {
            (0..grid.len())
                .into_par_iter()
                .filter_map(|c| {
                    let (i, j, k) = grid.coords(c);
                    let mut f = [i, j, k];
                    f[a] = (f[a] + 1) % n[a];
                    let k_b = cond[[i, j, k]];
                    let k_f = cond[[f[0], f[1], f[2]]];
                    (k_b != k_f && k_b + k_f > 0.0).then(|| Interface {
                        back: c,
                        front: grid.idx(f[0], f[1], f[2]),
                        b: (k_f - k_b) / (k_f + k_b),
                    })
                })
                .collect()
        });
        let len = interfaces.iter().map(Vec::len).sum();
        Self {
            grid,
            poisson: PoissonSolver::new(grid),
            interfaces,
            len,
        }
    }

    pub fn interfaces(&self, axis: usize) -> &[Interface] {
        &self.interfaces[axis]
    }

    /// Jump sources as a cell field: each interface deposits `J / (2h)` into
    /// both adjacent cells, the image of the jump under the 7-point stencil.
    pub fn scatter(&self, j: &Array1<f64>) -> Array1<f64> {
        let half_h = 0.5 / self.grid.h;
        let mut rhs = Array1::zeros(self.grid.len());
        let mut offset = 0;
        for block in &self.interfaces {
            for (iface, &jv) in block.iter().zip(j.iter().skip(offset)) {
                rhs[iface.back] += half_h * jv;
                rhs[iface.front] += half_h * jv;
            }
            offset += block.len();
        }
        rhs
    }

    /// The bulk potential induced by a jump vector.
    pub fn potential(&self, j: &Array1<f64>) -> Array1<f64> {
        self.poisson.solve(&self.scatter(j))
    }

    /// Right-hand side for a unit applied gradient along `axis`: `-2 b` on
    /// interfaces normal to the solve axis, zero elsewhere.
    pub fn forcing(&self, axis: usize) -> Array1<f64> {
        let mut f = Array1::zeros(self.len);
        let offset: usize = self.interfaces[..axis].iter().map(Vec::len).sum();
        for (slot, iface) in f
            .iter_mut()
            .skip(offset)
            .zip(self.interfaces[axis].iter())
        {
            *slot = -2.0 * iface.b;
        }
        f
    }
}

impl LinearOperator for EjOperator {
    fn len(&self) -> usize {
        self.len
    }

    fn apply_into(&self, x: &Array1<f64>, out: &mut Array1<f64>) {
        let u = self.potential(x);
        let two_over_h = 2.0 / self.grid.h;
        let us = u.as_slice().expect("potential is contiguous");
        let xs = x.as_slice().expect("jump vector is contiguous");
        let outs = out.as_slice_mut().expect("output is contiguous");
        let mut offset = 0;
        for block in &self.interfaces {
            let (xs_b, outs_b) = (
                &xs[offset..offset + block.len()],
                &mut outs[offset..offset + block.len()],
            );
            outs_b
                .par_iter_mut()
                .zip(xs_b.par_iter())
                .zip(block.par_iter())
                .for_each(|((o, &jv), iface)| {
                    *o = jv + two_over_h * iface.b * (us[iface.front] - us[iface.back]);
                });
            offset += block.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;

    fn laminate(n: usize) -> (Grid3D, Array3<f64>) {
        let grid = Grid3D::new(n, 2, 2, 1.0);
        let cond = Array3::from_shape_fn((n, 2, 2), |(i, _, _)| if i < n / 2 { 1.0 } else { 3.0 });
        (grid, cond)
    }

    #[test]
    fn homogeneous_medium_has_no_interfaces() {
        let grid = Grid3D::new(3, 3, 3, 1.0);
        let cond = Array3::from_elem((3, 3, 3), 2.0);
        let op = EjOperator::new(grid, &cond);
        assert_eq!(op.len(), 0);
    }

    #[test]
    fn laminate_interfaces_and_contrast() {
        let (grid, cond) = laminate(4);
        let op = EjOperator::new(grid, &cond);
        // two interface layers normal to x, none across y or z
        assert_eq!(op.interfaces(0).len(), 2 * 4);
        assert_eq!(op.interfaces(1).len(), 0);
        assert_eq!(op.interfaces(2).len(), 0);
        for iface in op.interfaces(0) {
            assert_abs_diff_eq!(iface.b.abs(), 0.5);
        }
    }

    #[test]
    fn scatter_deposits_into_both_cells() {
        let (grid, cond) = laminate(4);
        let op = EjOperator::new(grid, &cond);
        let j = Array1::from_elem(op.len(), 2.0);
        let rhs = op.scatter(&j);
        // every cell touches exactly one interface in this laminate
        for v in &rhs {
            assert_abs_diff_eq!(*v, 1.0);
        }
    }

    #[test]
    fn interface_blocks_stay_in_cell_order() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let grid = Grid3D::new(4, 3, 5, 1.0);
        let mut rng = StdRng::seed_from_u64(21);
        let cond =
            Array3::from_shape_fn((4, 3, 5), |_| if rng.gen_bool(0.5) { 1.0 } else { 4.0 });
        let op = EjOperator::new(grid, &cond);
        assert!(op.len() > 0);
        // one face per cell and axis, so back indices must increase strictly
        for a in 0..3 {
            for pair in op.interfaces(a).windows(2) {
                assert!(pair[0].back < pair[1].back);
            }
        }
    }

    #[test]
    fn jump_operator_is_linear() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let (grid, cond) = laminate(4);
        let op = EjOperator::new(grid, &cond);
        let mut rng = StdRng::seed_from_u64(9);
        let x = Array1::from_shape_fn(op.len(), |_| rng.gen_range(-1.0..1.0));
        let y = Array1::from_shape_fn(op.len(), |_| rng.gen_range(-1.0..1.0));
        let lhs = op.apply(&(&x * 1.5 + &y * -2.0));
        let rhs = &op.apply(&x) * 1.5 + &op.apply(&y) * -2.0;
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn forcing_targets_the_solve_axis_block() {
        let (grid, cond) = laminate(4);
        let op = EjOperator::new(grid, &cond);
        let f = op.forcing(0);
        assert_eq!(f.len(), op.len());
        for (v, iface) in f.iter().zip(op.interfaces(0)) {
            assert_abs_diff_eq!(*v, -2.0 * iface.b);
        }
        let fy = op.forcing(1);
        for v in &fy {
            assert_abs_diff_eq!(*v, 0.0);
        }
    }
}
