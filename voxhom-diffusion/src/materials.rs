//! Material conductivities: scalar, oriented transverse-isotropic, and full
//! symmetric tensors, plus the per-voxel fields the engines consume.

use std::collections::BTreeMap;

use ndarray::Array3;

use crate::error::DiffusionError;
use crate::grid::VoxelGrid;

/// Magnitude threshold above which an orientation vector is treated as an
/// intersection marker rather than a direction.
const INTERSECTION_NORM: f64 = 1.5;

/// Conductivity of one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conductivity {
    Isotropic(f64),
    /// Transverse isotropy around a per-voxel axis: `axial` along the local
    /// orientation, `radial` across it.
    OrientedPair { axial: f64, radial: f64 },
    /// Full symmetric tensor, components ordered xx, yy, zz, xy, xz, yz.
    Tensor([f64; 6]),
}

impl Conductivity {
    pub fn is_isotropic(&self) -> bool {
        matches!(self, Conductivity::Isotropic(_))
    }

    fn check_non_negative(&self, id: u16) -> Result<(), DiffusionError> {
        let bad = match *self {
            Conductivity::Isotropic(k) => k < 0.0,
            Conductivity::OrientedPair { axial, radial } => axial < 0.0 || radial < 0.0,
            Conductivity::Tensor(t) => t[0] < 0.0 || t[1] < 0.0 || t[2] < 0.0,
        };
        if bad {
            Err(DiffusionError::NegativeConductivity { id })
        } else {
            Ok(())
        }
    }
}

/// Material ID to conductivity mapping.
#[derive(Debug, Clone, Default)]
pub struct MaterialMap {
    entries: BTreeMap<u16, Conductivity>,
}

impl MaterialMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u16, cond: Conductivity) -> &mut Self {
        self.entries.insert(id, cond);
        self
    }

    pub fn get(&self, id: u16) -> Option<&Conductivity> {
        self.entries.get(&id)
    }

    /// True when every entry is a plain scalar.
    pub fn all_isotropic(&self) -> bool {
        self.entries.values().all(Conductivity::is_isotropic)
    }

    /// True when any entry needs a per-voxel orientation.
    pub fn needs_orientation(&self) -> bool {
        self.entries
            .values()
            .any(|c| matches!(c, Conductivity::OrientedPair { .. }))
    }

    /// Check that every ID present in the volume is mapped with a
    /// non-negative conductivity.
    pub fn validate(&self, volume: &VoxelGrid) -> Result<(), DiffusionError> {
        for (&id, cond) in &self.entries {
            cond.check_non_negative(id)?;
        }
        for &id in volume.ids() {
            if !self.entries.contains_key(&id) {
                return Err(DiffusionError::UnmappedMaterial { id });
            }
        }
        Ok(())
    }
}

/// Symmetric 3x3 tensor stored by its six independent components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymTensor3 {
    pub xx: f64,
    pub yy: f64,
    pub zz: f64,
    pub xy: f64,
    pub xz: f64,
    pub yz: f64,
}

impl SymTensor3 {
    pub fn isotropic(k: f64) -> Self {
        Self {
            xx: k,
            yy: k,
            zz: k,
            ..Default::default()
        }
    }

    pub fn from_components(c: [f64; 6]) -> Self {
        Self {
            xx: c[0],
            yy: c[1],
            zz: c[2],
            xy: c[3],
            xz: c[4],
            yz: c[5],
        }
    }

    /// Transverse-isotropic tensor `k_r I + (k_a - k_r) d d^T` for unit
    /// direction `d`. A vector with norm above the intersection threshold
    /// stands for "several directions meet here" and degrades to the
    /// orientation average `(k_a + 2 k_r) / 3`.
    pub fn oriented(axial: f64, radial: f64, dir: [f64; 3]) -> Self {
        let norm2 = dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2];
        if norm2.sqrt() >= INTERSECTION_NORM {
            return Self::isotropic((axial + 2.0 * radial) / 3.0);
        }
        let diff = axial - radial;
        Self {
            xx: radial + diff * dir[0] * dir[0],
            yy: radial + diff * dir[1] * dir[1],
            zz: radial + diff * dir[2] * dir[2],
            xy: diff * dir[0] * dir[1],
            xz: diff * dir[0] * dir[2],
            yz: diff * dir[1] * dir[2],
        }
    }

    /// Component by row and column index.
    #[inline]
    pub fn component(&self, row: usize, col: usize) -> f64 {
        match (row.min(col), row.max(col)) {
            (0, 0) => self.xx,
            (1, 1) => self.yy,
            (2, 2) => self.zz,
            (0, 1) => self.xy,
            (0, 2) => self.xz,
            (1, 2) => self.yz,
            _ => unreachable!(),
        }
    }

    /// Matrix-vector product.
    #[inline]
    pub fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        [
            self.xx * v[0] + self.xy * v[1] + self.xz * v[2],
            self.xy * v[0] + self.yy * v[1] + self.yz * v[2],
            self.xz * v[0] + self.yz * v[1] + self.zz * v[2],
        ]
    }

    /// Tensor after mirror reflection across the plane normal to `axis`.
    /// Off-diagonal components coupling the mirrored axis flip sign.
    pub fn reflected(&self, axis: usize) -> Self {
        let mut r = *self;
        match axis {
            0 => {
                r.xy = -r.xy;
                r.xz = -r.xz;
            }
            1 => {
                r.xy = -r.xy;
                r.yz = -r.yz;
            }
            _ => {
                r.xz = -r.xz;
                r.yz = -r.yz;
            }
        }
        r
    }

    pub fn trace(&self) -> f64 {
        self.xx + self.yy + self.zz
    }
}

/// Per-voxel scalar conductivity for the isotropic engines. Tensor and
/// oriented entries degrade to their orientation average; callers that want
/// them resolved exactly go through the anisotropic engine instead.
pub fn build_scalar_field(
    volume: &VoxelGrid,
    materials: &MaterialMap,
) -> Result<Array3<f64>, DiffusionError> {
    materials.validate(volume)?;
    let ids = volume.ids();
    let mut out = Array3::zeros(ids.dim());
    for (o, &id) in out.iter_mut().zip(ids.iter()) {
        // validate() guarantees the lookup succeeds
        *o = match materials.entries[&id] {
            Conductivity::Isotropic(k) => k,
            Conductivity::OrientedPair { axial, radial } => (axial + 2.0 * radial) / 3.0,
            Conductivity::Tensor(t) => (t[0] + t[1] + t[2]) / 3.0,
        };
    }
    Ok(out)
}

/// Per-voxel full tensors for the anisotropic engine, in grid index order.
/// Oriented-pair materials require the orientation field.
pub fn build_tensor_field(
    volume: &VoxelGrid,
    materials: &MaterialMap,
    orientation: Option<&Array3<[f64; 3]>>,
) -> Result<Vec<SymTensor3>, DiffusionError> {
    materials.validate(volume)?;
    if materials.needs_orientation() && orientation.is_none() {
        return Err(DiffusionError::MissingOrientation);
    }
    let ids = volume.ids();
    let mut out = Vec::with_capacity(volume.grid().len());
    for (idx, &id) in ids.iter().enumerate() {
        let t = match materials.entries[&id] {
            Conductivity::Isotropic(k) => SymTensor3::isotropic(k),
            Conductivity::Tensor(c) => SymTensor3::from_components(c),
            Conductivity::OrientedPair { axial, radial } => {
                // checked above
                let dirs = orientation.ok_or(DiffusionError::MissingOrientation)?;
                let (i, j, k) = volume.grid().coords(idx);
                SymTensor3::oriented(axial, radial, dirs[[i, j, k]])
            }
        };
        out.push(t);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;

    fn volume_two_phase() -> VoxelGrid {
        let mut ids = Array3::<u16>::zeros((2, 2, 2));
        ids[[1, 0, 0]] = 1;
        VoxelGrid::new(ids, 1.0).unwrap()
    }

    #[test]
    fn validate_catches_unmapped_and_negative() {
        let vol = volume_two_phase();
        let mut mats = MaterialMap::new();
        mats.insert(0, Conductivity::Isotropic(1.0));
        assert!(matches!(
            mats.validate(&vol),
            Err(DiffusionError::UnmappedMaterial { id: 1 })
        ));
        mats.insert(1, Conductivity::Isotropic(-2.0));
        assert!(matches!(
            mats.validate(&vol),
            Err(DiffusionError::NegativeConductivity { id: 1 })
        ));
    }

    #[test]
    fn oriented_tensor_matches_rank_one_form() {
        let d = [1.0 / 3f64.sqrt(); 3];
        let t = SymTensor3::oriented(5.0, 2.0, d);
        // k_r + (k_a - k_r)/3 on the diagonal, (k_a - k_r)/3 off it
        assert_abs_diff_eq!(t.xx, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.xy, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.trace(), 5.0 + 2.0 * 2.0, epsilon = 1e-12);
        // K d = k_a d for the axial direction
        let kd = t.mul_vec(d);
        for c in 0..3 {
            assert_abs_diff_eq!(kd[c], 5.0 * d[c], epsilon = 1e-12);
        }
    }

    #[test]
    fn intersection_marker_degrades_to_isotropic() {
        let t = SymTensor3::oriented(6.0, 3.0, [2.0, 0.0, 0.0]);
        assert_eq!(t, SymTensor3::isotropic(4.0));
    }

    #[test]
    fn reflection_flips_coupled_shears() {
        let t = SymTensor3::from_components([1.0, 2.0, 3.0, 0.4, 0.5, 0.6]);
        let r = t.reflected(0);
        assert_eq!(r.xy, -0.4);
        assert_eq!(r.xz, -0.5);
        assert_eq!(r.yz, 0.6);
        // reflecting twice is the identity
        assert_eq!(r.reflected(0), t);
    }

    #[test]
    fn tensor_field_requires_orientation_for_pairs() {
        let vol = volume_two_phase();
        let mut mats = MaterialMap::new();
        mats.insert(0, Conductivity::Isotropic(1.0));
        mats.insert(
            1,
            Conductivity::OrientedPair {
                axial: 4.0,
                radial: 1.0,
            },
        );
        assert!(matches!(
            build_tensor_field(&vol, &mats, None),
            Err(DiffusionError::MissingOrientation)
        ));
        let dirs = Array3::from_elem((2, 2, 2), [0.0, 0.0, 1.0]);
        let field = build_tensor_field(&vol, &mats, Some(&dirs)).unwrap();
        assert_eq!(field.len(), 8);
        let t1 = field[vol.grid().idx(1, 0, 0)];
        assert_abs_diff_eq!(t1.zz, 4.0);
        assert_abs_diff_eq!(t1.xx, 1.0);
    }
}
