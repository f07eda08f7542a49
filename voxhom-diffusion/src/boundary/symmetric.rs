//! Mirror-symmetry boundary (zero normal flux).

use ndarray::ArrayView3;

use super::{harmonic_face, BoundaryCondition};
use crate::grid::mirror_index;

/// The domain is mirrored at the face: the ghost cell equals the inside cell,
/// so no flux crosses the boundary. The face coefficient pairs the inside
/// conductivity with itself; the zero-difference ghost value is what makes
/// the flux vanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct Symmetric;

impl BoundaryCondition for Symmetric {
    fn value_at(&self, field: ArrayView3<'_, f64>, i: isize, j: isize, k: isize) -> f64 {
        let (nx, ny, nz) = field.dim();
        field[[mirror_index(nx, i), mirror_index(ny, j), mirror_index(nz, k)]]
    }

    fn face_conductivity(
        &self,
        _cond: ArrayView3<'_, f64>,
        inside: f64,
        _i: isize,
        _j: isize,
        _k: isize,
    ) -> f64 {
        harmonic_face(inside, inside)
    }
}
