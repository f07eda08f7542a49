//! Fixed-temperature (Dirichlet) boundary.

use ndarray::ArrayView3;

use super::BoundaryCondition;

/// The temperature on the domain face is held at a fixed value. The value is
/// imposed at the face itself, half a cell from the first centre; over the
/// full-cell spacing of the stencil the half-cell flux works out to the
/// inside conductivity as the face coefficient.
#[derive(Debug, Clone, Copy)]
pub struct ConstantValue {
    pub value: f64,
}

impl ConstantValue {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl BoundaryCondition for ConstantValue {
    fn value_at(&self, _field: ArrayView3<'_, f64>, _i: isize, _j: isize, _k: isize) -> f64 {
        self.value
    }

    fn face_conductivity(
        &self,
        _cond: ArrayView3<'_, f64>,
        inside: f64,
        _i: isize,
        _j: isize,
        _k: isize,
    ) -> f64 {
        inside
    }
}
