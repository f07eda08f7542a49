//! Iterative (Krylov) solvers
//!
//! Conjugate Gradient for symmetric definite operators and BiCGSTAB for
//! general ones. Both work purely through the [`LinearOperator`] action and
//! the parallel kernels in [`crate::linalg`], update the solution vector in
//! place (so a caller-supplied initial guess is honored), and terminate on an
//! absolute residual norm.
//!
//! [`LinearOperator`]: crate::traits::LinearOperator

pub mod bicgstab;
pub mod cg;

pub use bicgstab::{bicgstab, BicgstabConfig};
pub use cg::{cg, CgConfig};

use std::fmt;

/// Division-by-zero conditions detected inside a Krylov iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown {
    /// `ρ = (r̃, r)` vanished.
    Rho,
    /// `(r̃, A·p)` (BiCGSTAB) or `(p, A·p)` (CG) vanished.
    SearchCollapse,
    /// Stabilization weight `ω` vanished.
    Omega,
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breakdown::Rho => write!(f, "rho vanished"),
            Breakdown::SearchCollapse => write!(f, "search direction dot product vanished"),
            Breakdown::Omega => write!(f, "stabilization weight omega vanished"),
        }
    }
}

/// Result of a Krylov solve; the solution itself is left in the caller's
/// vector.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final absolute residual norm.
    pub residual: f64,
    /// Whether `‖r‖ < tol` was reached.
    pub converged: bool,
    /// Breakdown condition, if the solve aborted on one.
    pub breakdown: Option<Breakdown>,
}

/// Threshold below which a pivotal dot product counts as a breakdown.
pub(crate) const BREAKDOWN_EPS: f64 = 1e-30;
