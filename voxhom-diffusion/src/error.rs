//! Error taxonomy shared across the engines.

use thiserror::Error;

/// Everything that can go wrong before or during a homogenization run.
///
/// Failure to reach the requested tolerance is NOT an error: it is reported
/// in-band through the result's `converged` flag so that partially converged
/// fields stay inspectable. Hard solver breakdowns, by contrast, surface as
/// [`DiffusionError::Breakdown`].
#[derive(Debug, Error)]
pub enum DiffusionError {
    #[error("unknown direction '{0}' (expected x, y, z or all)")]
    InvalidDirection(String),

    #[error("unknown solver '{0}' (expected cg or bicgstab)")]
    InvalidSolver(String),

    #[error("unknown side boundary condition '{0}' (expected periodic or symmetric)")]
    InvalidSideBc(String),

    #[error("unknown anisotropic method '{0}' (expected mpfa or empfa)")]
    InvalidMethod(String),

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("voxel size must be positive and finite, got {0}")]
    InvalidVoxelSize(f64),

    #[error("segmented volume has a zero-length axis")]
    EmptyGrid,

    #[error("material id {0} exceeds the supported range")]
    MaterialIdOutOfRange(u16),

    #[error("axis {axis} has {len} cells; the anisotropic stencil needs at least 3")]
    DomainTooSmall { axis: usize, len: usize },

    #[error("material {id} has a negative conductivity")]
    NegativeConductivity { id: u16 },

    #[error("material id {id} appears in the volume but has no conductivity entry")]
    UnmappedMaterial { id: u16 },

    #[error("oriented-pair conductivities require a per-voxel orientation field")]
    MissingOrientation,

    #[error("prescribed boundary layer shape does not match the cross-section")]
    PrescribedBcShape,

    #[error("{solver} broke down ({reason}) after {iterations} iterations")]
    Breakdown {
        solver: &'static str,
        reason: String,
        iterations: usize,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}
