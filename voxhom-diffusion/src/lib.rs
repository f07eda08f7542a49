//! Steady-state diffusion homogenization of voxel microstructures
//!
//! This crate computes effective transport coefficients (thermal/electrical
//! conductivity, diffusive tortuosity) of a 3D segmented microstructure by
//! solving a steady-state diffusion equation under an imposed unit
//! macroscopic gradient and averaging the resulting flux field.
//!
//! # Engines
//!
//! - **Explicit Jump** ([`ej`]): the domain is a homogeneous background
//!   Laplacian plus jump unknowns at material interfaces, solved through an
//!   FFT-diagonalized pseudo-inverse. Periodic topology only.
//! - **Finite volume, isotropic** ([`fv`]): flux-conservative harmonic-mean
//!   face conductivities with pluggable ghost-cell boundary conditions.
//! - **Finite volume, anisotropic** ([`fv_anisotropic`]): full-tensor
//!   conductivities with MPFA-O / eMPFA multi-point flux reconstruction from
//!   per-corner 12×12 local stencils.
//!
//! # Example
//!
//! ```
//! use voxhom_diffusion::{
//!     effective_conductivity, Conductivity, Discretization, MaterialMap, SolveOptions, VoxelGrid,
//! };
//! use ndarray::Array3;
//!
//! let ids = Array3::<u16>::zeros((8, 8, 8));
//! let vox = VoxelGrid::new(ids, 1.0)?;
//! let mut map = MaterialMap::new();
//! map.insert(0, Conductivity::Isotropic(2.5));
//!
//! let results = effective_conductivity(
//!     &vox,
//!     &map,
//!     None,
//!     Discretization::FiniteVolume,
//!     &SolveOptions::default(),
//! )?;
//! assert!((results[0].coefficient[0] - 2.5).abs() < 1e-6);
//! # Ok::<(), voxhom_diffusion::DiffusionError>(())
//! ```

pub mod boundary;
pub mod config;
pub mod ej;
pub mod error;
pub mod fields;
pub mod fv;
pub mod fv_anisotropic;
pub mod grid;
pub mod homogenization;
pub mod materials;

pub use config::{AnisotropicOptions, Direction, Method, SideBc, SolveOptions, SolverKind};
pub use error::DiffusionError;
pub use grid::{Grid3D, VoxelGrid};
pub use homogenization::{
    effective_conductivity, effective_conductivity_anisotropic, Discretization, Homogenized,
};
pub use materials::{Conductivity, MaterialMap, SymTensor3};
