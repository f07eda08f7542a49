//! Core traits for matrix-free linear algebra
//!
//! [`LinearOperator`] is the contract every discretization engine implements:
//! a linear map exposed only through its action `r = A·x`, never materialized
//! as an explicit matrix. Solvers operate exclusively through this trait and
//! dense vector buffers.

use ndarray::{Array1, Array2};

/// A linear operator exposed only through its matrix-vector product.
///
/// Implementations must be free of side effects beyond writing `out`: the
/// Krylov solvers call `apply_into` repeatedly and rely on the action being a
/// pure function of `x`.
pub trait LinearOperator: Send + Sync {
    /// Length of the vectors the operator acts on.
    fn len(&self) -> usize;

    /// Whether the operator acts on zero-length vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute `out = A·x`.
    ///
    /// `x` and `out` must both have length [`len`](LinearOperator::len).
    fn apply_into(&self, x: &Array1<f64>, out: &mut Array1<f64>);

    /// Allocating convenience wrapper around [`apply_into`](LinearOperator::apply_into).
    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(self.len());
        self.apply_into(x, &mut out);
        out
    }
}

/// Dense square matrix wrapper implementing [`LinearOperator`].
///
/// Used by tests and for small explicitly-assembled systems; the engines
/// themselves never materialize their operators.
#[derive(Debug, Clone)]
pub struct DenseMatrix {
    data: Array2<f64>,
}

impl DenseMatrix {
    /// Wrap a square matrix.
    pub fn new(data: Array2<f64>) -> Self {
        debug_assert_eq!(data.nrows(), data.ncols(), "operator must be square");
        Self { data }
    }

    pub fn inner(&self) -> &Array2<f64> {
        &self.data
    }
}

impl LinearOperator for DenseMatrix {
    fn len(&self) -> usize {
        self.data.nrows()
    }

    fn apply_into(&self, x: &Array1<f64>, out: &mut Array1<f64>) {
        out.assign(&self.data.dot(x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn dense_matrix_applies() {
        let a = DenseMatrix::new(array![[2.0, 0.0], [1.0, 3.0]]);
        let x = array![1.0, 2.0];
        let y = a.apply(&x);
        assert_relative_eq!(y[0], 2.0);
        assert_relative_eq!(y[1], 7.0);
        assert_eq!(a.len(), 2);
        assert!(!a.is_empty());
    }
}
