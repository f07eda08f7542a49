//! Boundary conditions at the six domain faces.
//!
//! A condition answers two questions for a stencil reaching one cell past
//! the domain: what temperature lives in the ghost cell, and what transfer
//! coefficient the boundary face carries.

mod constant;
mod periodic;
mod symmetric;

pub use constant::ConstantValue;
pub use periodic::Periodic;
pub use symmetric::Symmetric;

use ndarray::ArrayView3;

use crate::config::SideBc;

/// Ghost-cell semantics for one face of the domain.
pub trait BoundaryCondition: Send + Sync {
    /// Temperature at an out-of-range cell (i, j, k), at most one cell past
    /// the domain along the face's axis.
    fn value_at(&self, field: ArrayView3<'_, f64>, i: isize, j: isize, k: isize) -> f64;

    /// Transfer coefficient for the boundary face, given the conductivity
    /// field and the inside cell's conductivity.
    fn face_conductivity(
        &self,
        cond: ArrayView3<'_, f64>,
        inside: f64,
        i: isize,
        j: isize,
        k: isize,
    ) -> f64;
}

/// One condition per side per axis, indexed `[axis][side]`.
pub type BoundarySet = [[Box<dyn BoundaryCondition>; 2]; 3];

/// The standard arrangement for a solve along `axis`: fixed values `low` and
/// `high` on the two faces normal to the solve axis, the configured side
/// condition on the remaining four faces.
pub fn axis_boundaries(axis: usize, side_bc: SideBc, low: f64, high: f64) -> BoundarySet {
    std::array::from_fn(|d| {
        if d == axis {
            [
                Box::new(ConstantValue::new(low)) as Box<dyn BoundaryCondition>,
                Box::new(ConstantValue::new(high)),
            ]
        } else {
            match side_bc {
                SideBc::Periodic => [
                    Box::new(Periodic) as Box<dyn BoundaryCondition>,
                    Box::new(Periodic),
                ],
                SideBc::Symmetric => [
                    Box::new(Symmetric) as Box<dyn BoundaryCondition>,
                    Box::new(Symmetric),
                ],
            }
        }
    })
}

/// Transfer coefficient of an interior face between conductivities `k1` and
/// `k2`: half the harmonic mean. A face touching a non-conducting cell
/// carries no flux.
#[inline]
pub fn harmonic_face(k1: f64, k2: f64) -> f64 {
    let sum = k1 + k2;
    if sum == 0.0 {
        0.0
    } else {
        k1 * k2 / sum
    }
}
