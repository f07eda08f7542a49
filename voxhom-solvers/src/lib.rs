//! Matrix-free linear algebra for voxel homogenization
//!
//! This crate provides the solver-side building blocks shared by all
//! discretization engines:
//!
//! - **Matrix-free operators**: the [`LinearOperator`] contract, exposing a
//!   linear map only through its action `r = A·x`
//! - **Krylov solvers**: Conjugate Gradient and BiCGSTAB with initial-guess
//!   support and breakdown detection
//! - **Direct solver**: dense LU with partial pivoting for small local systems
//! - **Parallel kernels**: rayon-backed dot products and vector updates, plus
//!   explicit worker-pool sizing
//!
//! # Example
//!
//! ```ignore
//! use voxhom_solvers::{cg, CgConfig, DenseMatrix};
//! use ndarray::{array, Array1};
//!
//! let a = DenseMatrix::new(array![[4.0, 1.0], [1.0, 3.0]]);
//! let b = array![1.0, 2.0];
//! let mut x = Array1::zeros(2);
//! let outcome = cg(&a, &mut x, Some(&b), &CgConfig::default());
//! assert!(outcome.converged);
//! ```

pub mod direct;
pub mod iterative;
pub mod linalg;
pub mod parallel;
pub mod traits;

// Re-export main types
pub use direct::{lu_factorize, LuError, LuFactorization};
pub use iterative::{bicgstab, cg, BicgstabConfig, Breakdown, CgConfig, SolveOutcome};
pub use parallel::{build_pool, resolve_threads};
pub use traits::{DenseMatrix, LinearOperator};
