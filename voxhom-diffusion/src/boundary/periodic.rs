//! Periodic wrap-around boundary.

use ndarray::ArrayView3;

use super::{harmonic_face, BoundaryCondition};
use crate::grid::wrap_index;

/// The domain repeats: a ghost cell is the cell on the opposite face, and
/// the boundary face behaves like any interior face.
#[derive(Debug, Clone, Copy, Default)]
pub struct Periodic;

impl Periodic {
    fn wrap(field: ArrayView3<'_, f64>, i: isize, j: isize, k: isize) -> f64 {
        let (nx, ny, nz) = field.dim();
        field[[wrap_index(nx, i), wrap_index(ny, j), wrap_index(nz, k)]]
    }
}

impl BoundaryCondition for Periodic {
    fn value_at(&self, field: ArrayView3<'_, f64>, i: isize, j: isize, k: isize) -> f64 {
        Self::wrap(field, i, j, k)
    }

    fn face_conductivity(
        &self,
        cond: ArrayView3<'_, f64>,
        inside: f64,
        i: isize,
        j: isize,
        k: isize,
    ) -> f64 {
        harmonic_face(inside, Self::wrap(cond, i, j, k))
    }
}
