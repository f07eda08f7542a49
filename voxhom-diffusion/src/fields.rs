//! Scalar field helpers: affine profiles and flat/3D conversions.

use ndarray::{Array1, Array3, ArrayView3, ArrayViewMut3};

use crate::grid::Grid3D;

/// The affine temperature profile `T0 = (i_d + 0.5) h` for a unit gradient
/// along `axis`. Cell-centred, so the profile reaches `0` and `n_d h` at the
/// (virtual) domain faces, not at the first and last cell centres.
pub fn linear_profile(grid: &Grid3D, axis: usize) -> Array3<f64> {
    let h = grid.h;
    Array3::from_shape_fn((grid.nx, grid.ny, grid.nz), |(i, j, k)| {
        let d = [i, j, k][axis];
        (d as f64 + 0.5) * h
    })
}

/// Flat copy of a 3D field in grid index order.
pub fn flatten(field: &Array3<f64>) -> Array1<f64> {
    if let Some(slice) = field.as_slice() {
        Array1::from_vec(slice.to_vec())
    } else {
        Array1::from_iter(field.iter().copied())
    }
}

/// Borrow a flat vector as a 3D view over the grid.
pub fn view3<'a>(grid: &Grid3D, flat: &'a Array1<f64>) -> ArrayView3<'a, f64> {
    let dim = (grid.nx, grid.ny, grid.nz);
    ArrayView3::from_shape(dim, flat.as_slice().expect("flat field is contiguous"))
        .expect("flat field length matches grid")
}

/// Mutable 3D view of a flat vector.
pub fn view3_mut<'a>(grid: &Grid3D, flat: &'a mut Array1<f64>) -> ArrayViewMut3<'a, f64> {
    let dim = (grid.nx, grid.ny, grid.nz);
    ArrayViewMut3::from_shape(dim, flat.as_slice_mut().expect("flat field is contiguous"))
        .expect("flat field length matches grid")
}

/// 3D view of a flat vector; inverse of [`flatten`].
pub fn unflatten(grid: &Grid3D, flat: &Array1<f64>) -> Array3<f64> {
    debug_assert_eq!(flat.len(), grid.len());
    Array3::from_shape_fn((grid.nx, grid.ny, grid.nz), |(i, j, k)| {
        flat[grid.idx(i, j, k)]
    })
}
