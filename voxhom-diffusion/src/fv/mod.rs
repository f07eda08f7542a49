//! Isotropic finite-volume engine.
//!
//! Two-point flux approximation on the voxel grid: each face carries half the
//! harmonic mean of the adjacent conductivities, boundary faces follow the
//! configured [`BoundaryCondition`](crate::boundary::BoundaryCondition). The
//! homogenized coefficient comes out of the converged temperature field as a
//! volume average of face fluxes.

mod diffusion;
mod operator;

pub use diffusion::solve_axis;
pub use operator::FvOperator;
