//! Periodic Poisson pseudo-inverse via 3D FFT.

use std::sync::Arc;

use ndarray::Array1;
use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::grid::Grid3D;

/// Inverts the periodic 7-point Laplacian spectrally.
///
/// Eigenvalues are those of the discrete stencil,
/// `2 [(cos(2 pi i / nx) - 1) + ... ] / h^2`; the zero mode is passed
/// through unchanged, so the result is the pseudo-inverse plus the mean of
/// the right-hand side.
pub struct PoissonSolver {
    grid: Grid3D,
    fwd: [Arc<dyn Fft<f64>>; 3],
    inv: [Arc<dyn Fft<f64>>; 3],
    /// Reciprocal eigenvalues, stored in the x-transposed layout
    /// `(j * nz + k) * nx + i` where the division happens.
    inv_eigen: Vec<f64>,
}

impl PoissonSolver {
    pub fn new(grid: Grid3D) -> Self {
        let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
        let mut planner = FftPlanner::new();
        let fwd = [
            planner.plan_fft_forward(nx),
            planner.plan_fft_forward(ny),
            planner.plan_fft_forward(nz),
        ];
        let inv = [
            planner.plan_fft_inverse(nx),
            planner.plan_fft_inverse(ny),
            planner.plan_fft_inverse(nz),
        ];
        let h2 = grid.h * grid.h;
        let angle = |idx: usize, n: usize| {
            (2.0 * std::f64::consts::PI * idx as f64 / n as f64).cos() - 1.0
        };
        let mut inv_eigen = vec![0.0; grid.len()];
        for j in 0..ny {
            for k in 0..nz {
                for i in 0..nx {
                    let lambda = 2.0 * (angle(i, nx) + angle(j, ny) + angle(k, nz)) / h2;
                    inv_eigen[(j * nz + k) * nx + i] =
                        if lambda == 0.0 { 1.0 } else { 1.0 / lambda };
                }
            }
        }
        Self {
            grid,
            fwd,
            inv,
            inv_eigen,
        }
    }

    /// Solve `laplacian(u) = rhs` for the zero-mean part of `rhs`; the mean
    /// itself passes through unchanged.
    pub fn solve(&self, rhs: &Array1<f64>) -> Array1<f64> {
        let (nx, ny, nz) = (self.grid.nx, self.grid.ny, self.grid.nz);
        let n = self.grid.len();
        let mut buf: Vec<Complex<f64>> = rhs.iter().map(|&v| Complex::new(v, 0.0)).collect();

        // z lines are contiguous
        buf.par_chunks_exact_mut(nz)
            .for_each(|line| self.fwd[2].process(line));
        transform_y(&mut buf, ny, nz, &*self.fwd[1]);

        // x lines via transpose; the eigenvalue division lives in this layout
        let mut tbuf = vec![Complex::new(0.0, 0.0); n];
        tbuf.par_chunks_exact_mut(nx)
            .enumerate()
            .for_each(|(jk, line)| {
                for (i, v) in line.iter_mut().enumerate() {
                    *v = buf[i * ny * nz + jk];
                }
                self.fwd[0].process(line);
            });
        tbuf.par_iter_mut()
            .zip(self.inv_eigen.par_iter())
            .for_each(|(c, &e)| *c *= e);
        tbuf.par_chunks_exact_mut(nx)
            .for_each(|line| self.inv[0].process(line));
        buf.par_chunks_exact_mut(ny * nz)
            .enumerate()
            .for_each(|(i, block)| {
                for (jk, v) in block.iter_mut().enumerate() {
                    *v = tbuf[jk * nx + i];
                }
            });

        transform_y(&mut buf, ny, nz, &*self.inv[1]);
        buf.par_chunks_exact_mut(nz)
            .for_each(|line| self.inv[2].process(line));

        let scale = 1.0 / n as f64;
        Array1::from_iter(buf.iter().map(|c| c.re * scale))
    }
}

/// In-place FFT along y: strided lines gathered per (i, k) within each
/// contiguous i-block.
fn transform_y(buf: &mut [Complex<f64>], ny: usize, nz: usize, fft: &dyn Fft<f64>) {
    buf.par_chunks_exact_mut(ny * nz).for_each(|block| {
        let mut line = vec![Complex::new(0.0, 0.0); ny];
        for k in 0..nz {
            for j in 0..ny {
                line[j] = block[j * nz + k];
            }
            fft.process(&mut line);
            for j in 0..ny {
                block[j * nz + k] = line[j];
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn laplacian(grid: &Grid3D, u: &Array1<f64>) -> Array1<f64> {
        let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
        let h2 = grid.h * grid.h;
        let mut out = Array1::zeros(grid.len());
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let c = u[grid.idx(i, j, k)];
                    let mut acc = -6.0 * c;
                    acc += u[grid.idx((i + 1) % nx, j, k)] + u[grid.idx((i + nx - 1) % nx, j, k)];
                    acc += u[grid.idx(i, (j + 1) % ny, k)] + u[grid.idx(i, (j + ny - 1) % ny, k)];
                    acc += u[grid.idx(i, j, (k + 1) % nz)] + u[grid.idx(i, j, (k + nz - 1) % nz)];
                    out[grid.idx(i, j, k)] = acc / h2;
                }
            }
        }
        out
    }

    #[test]
    fn inverts_the_discrete_laplacian_up_to_the_mean() {
        let grid = Grid3D::new(6, 5, 4, 0.5);
        let mut rng = StdRng::seed_from_u64(7);
        let mut u0 = Array1::from_shape_fn(grid.len(), |_| rng.gen_range(-1.0..1.0));
        let mean = u0.sum() / grid.len() as f64;
        u0.mapv_inplace(|v| v - mean);

        let rhs = laplacian(&grid, &u0);
        let solver = PoissonSolver::new(grid);
        let u = solver.solve(&rhs);
        for (a, b) in u.iter().zip(u0.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn constant_input_passes_through() {
        let grid = Grid3D::new(4, 4, 4, 1.0);
        let solver = PoissonSolver::new(grid);
        let rhs = Array1::from_elem(grid.len(), 3.25);
        let u = solver.solve(&rhs);
        for v in &u {
            assert_abs_diff_eq!(*v, 3.25, epsilon = 1e-12);
        }
    }
}
