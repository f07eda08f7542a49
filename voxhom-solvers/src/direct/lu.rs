//! LU decomposition with partial pivoting
//!
//! Factorize once, then solve against one or many right-hand sides. The
//! multi-RHS path backs the per-corner 12×12 transmissibility solves of the
//! anisotropic engine, which need `C⁻¹·D` for an 8-column `D`.

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors that can occur during LU factorization or solve
#[derive(Error, Debug)]
pub enum LuError {
    #[error("matrix is singular or nearly singular")]
    SingularMatrix,
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

const PIVOT_EPS: f64 = 1e-30;

/// LU factorization result
///
/// Stores the combined L and U factors (L unit lower triangular, below the
/// diagonal) along with the pivot row chosen at each elimination step.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    lu: Array2<f64>,
    pivots: Vec<usize>,
    n: usize,
}

/// Compute the LU factorization of a square matrix with partial pivoting.
pub fn lu_factorize(a: &Array2<f64>) -> Result<LuFactorization, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[[i, k]].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val < PIVOT_EPS {
            return Err(LuError::SingularMatrix);
        }

        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
            pivots[k] = max_row;
        } else {
            pivots[k] = k;
        }

        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let factor = lu[[i, k]] / pivot;
            lu[[i, k]] = factor;
            for j in (k + 1)..n {
                let update = factor * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

impl LuFactorization {
    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Solve `A·x = b` for a single right-hand side.
    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        let mut x = b.clone();
        self.solve_in_place(x.as_slice_mut().ok_or(LuError::SingularMatrix)?)?;
        Ok(x)
    }

    /// Solve `A·X = B` column by column.
    pub fn solve_matrix(&self, b: &Array2<f64>) -> Result<Array2<f64>, LuError> {
        if b.nrows() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.nrows(),
            });
        }
        let mut x = Array2::zeros(b.raw_dim());
        let mut col = vec![0.0; self.n];
        for j in 0..b.ncols() {
            for i in 0..self.n {
                col[i] = b[[i, j]];
            }
            self.solve_in_place(&mut col)?;
            for i in 0..self.n {
                x[[i, j]] = col[i];
            }
        }
        Ok(x)
    }

    fn solve_in_place(&self, x: &mut [f64]) -> Result<(), LuError> {
        // Apply the recorded row swaps
        for i in 0..self.n {
            let p = self.pivots[i];
            if p != i {
                x.swap(i, p);
            }
        }

        // Forward substitution: L y = P b
        for i in 0..self.n {
            for j in 0..i {
                x[i] -= self.lu[[i, j]] * x[j];
            }
        }

        // Backward substitution: U x = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                x[i] -= self.lu[[i, j]] * x[j];
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.abs() < PIVOT_EPS {
                return Err(LuError::SingularMatrix);
            }
            x[i] /= u_ii;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn solves_small_system() {
        let a = array![[2.0, 1.0, 1.0], [4.0, -6.0, 0.0], [-2.0, 7.0, 2.0]];
        let b = array![5.0, -2.0, 9.0];
        let f = lu_factorize(&a).expect("nonsingular");
        let x = f.solve(&b).expect("solve");
        let ax = a.dot(&x);
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn solves_multiple_rhs() {
        let a = array![[3.0, 1.0], [1.0, 2.0]];
        let b = array![[1.0, 0.0], [0.0, 1.0]];
        let f = lu_factorize(&a).expect("nonsingular");
        let inv = f.solve_matrix(&b).expect("solve");
        // A * inv == I
        let prod = a.dot(&inv);
        assert_relative_eq!(prod[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(prod[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(prod[[1, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(prod[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![3.0, 7.0];
        let f = lu_factorize(&a).expect("nonsingular after pivoting");
        let x = f.solve(&b).expect("solve");
        assert_relative_eq!(x[0], 7.0);
        assert_relative_eq!(x[1], 3.0);
    }

    #[test]
    fn singular_matrix_detected() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(lu_factorize(&a), Err(LuError::SingularMatrix)));
    }

    #[test]
    fn dimension_mismatch_detected() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let f = lu_factorize(&a).expect("identity");
        let b = array![1.0, 2.0, 3.0];
        assert!(matches!(f.solve(&b), Err(LuError::DimensionMismatch { .. })));
    }
}
