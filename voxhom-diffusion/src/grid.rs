//! Uniform voxel grid and the segmented input volume.

use crate::error::DiffusionError;
use ndarray::Array3;

/// Largest material ID accepted in a segmented volume.
pub const MAX_MATERIAL_ID: u16 = 32767;

/// Uniform 3D grid: dimensions plus a cubic voxel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid3D {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Voxel edge length.
    pub h: f64,
}

impl Grid3D {
    pub fn new(nx: usize, ny: usize, nz: usize, h: f64) -> Self {
        Self { nx, ny, nz, h }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions as an array indexable by axis.
    pub fn dims(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Flat index of cell (i, j, k); row-major over (x, y, z).
    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny && k < self.nz);
        (i * self.ny + j) * self.nz + k
    }

    /// Inverse of [`idx`](Grid3D::idx).
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize, usize) {
        let k = idx % self.nz;
        let rest = idx / self.nz;
        (rest / self.ny, rest % self.ny, k)
    }
}

/// Periodic wrap of a possibly out-of-range index.
#[inline]
pub fn wrap_index(n: usize, i: isize) -> usize {
    let n = n as isize;
    (((i % n) + n) % n) as usize
}

/// Mirror of a possibly out-of-range index about the domain face:
/// `-1 → 0`, `n → n-1`.
#[inline]
pub fn mirror_index(n: usize, i: isize) -> usize {
    if i < 0 {
        (-i - 1) as usize
    } else if i as usize >= n {
        2 * n - 1 - i as usize
    } else {
        i as usize
    }
}

/// A segmented voxel volume: per-cell material IDs over a [`Grid3D`].
///
/// Read-only input to every engine; periodic topology is assumed at the grid
/// boundary where the discretization calls for it.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    grid: Grid3D,
    ids: Array3<u16>,
}

impl VoxelGrid {
    /// Wrap a segmented volume, validating dimensions and the ID range.
    pub fn new(ids: Array3<u16>, voxel_size: f64) -> Result<Self, DiffusionError> {
        let (nx, ny, nz) = ids.dim();
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(DiffusionError::EmptyGrid);
        }
        if !(voxel_size > 0.0) || !voxel_size.is_finite() {
            return Err(DiffusionError::InvalidVoxelSize(voxel_size));
        }
        if let Some(&id) = ids.iter().find(|&&id| id > MAX_MATERIAL_ID) {
            return Err(DiffusionError::MaterialIdOutOfRange(id));
        }
        Ok(Self {
            grid: Grid3D::new(nx, ny, nz, voxel_size),
            ids,
        })
    }

    pub fn grid(&self) -> Grid3D {
        self.grid
    }

    pub fn ids(&self) -> &Array3<u16> {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_indexing_round_trips() {
        let g = Grid3D::new(4, 3, 2, 1.0);
        assert_eq!(g.len(), 24);
        assert_eq!(g.idx(0, 0, 0), 0);
        assert_eq!(g.idx(0, 0, 1), 1);
        assert_eq!(g.idx(0, 1, 0), 2);
        assert_eq!(g.idx(1, 0, 0), 6);
        for idx in 0..g.len() {
            let (i, j, k) = g.coords(idx);
            assert_eq!(g.idx(i, j, k), idx);
        }
    }

    #[test]
    fn wrap_and_mirror() {
        assert_eq!(wrap_index(5, -1), 4);
        assert_eq!(wrap_index(5, 5), 0);
        assert_eq!(wrap_index(5, 2), 2);
        assert_eq!(mirror_index(5, -1), 0);
        assert_eq!(mirror_index(5, -2), 1);
        assert_eq!(mirror_index(5, 5), 4);
        assert_eq!(mirror_index(5, 3), 3);
    }

    #[test]
    fn rejects_empty_and_out_of_range() {
        let empty = Array3::<u16>::zeros((0, 2, 2));
        assert!(matches!(
            VoxelGrid::new(empty, 1.0),
            Err(DiffusionError::EmptyGrid)
        ));

        let mut ids = Array3::<u16>::zeros((2, 2, 2));
        ids[[0, 0, 0]] = MAX_MATERIAL_ID + 1;
        assert!(matches!(
            VoxelGrid::new(ids, 1.0),
            Err(DiffusionError::MaterialIdOutOfRange(_))
        ));

        let ids = Array3::<u16>::zeros((2, 2, 2));
        assert!(matches!(
            VoxelGrid::new(ids, 0.0),
            Err(DiffusionError::InvalidVoxelSize(_))
        ));
    }
}
