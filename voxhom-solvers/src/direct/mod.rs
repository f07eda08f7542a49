//! Direct solvers for small dense systems
//!
//! The engines assemble only small local systems (3×3 gradient recoveries,
//! 12×12 flux-transmissibility stencils), so a pure-Rust LU with partial
//! pivoting is all that is needed here.

pub mod lu;

pub use lu::{lu_factorize, LuError, LuFactorization};
