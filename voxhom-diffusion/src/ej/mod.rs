//! Explicit-jump engine.
//!
//! The unknowns are jumps in the normal temperature gradient at material
//! interfaces. The bulk problem is eliminated through a spectral Poisson
//! inverse, leaving a dense-but-small interface system solved iteratively.
//! The method is intrinsically periodic on all six faces.

mod diffusion;
mod operator;
mod poisson;

pub use diffusion::solve_axis;
pub use operator::EjOperator;
pub use poisson::PoissonSolver;
