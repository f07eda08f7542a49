//! Run configuration: axes, boundary selections, solver choices.

use std::str::FromStr;

use ndarray::Array2;

use crate::error::DiffusionError;

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Axis along which the unit temperature gradient is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
    Z,
    /// Solve all three axes in turn.
    All,
}

impl Direction {
    /// The solve axes this selection expands to.
    pub fn axes(self) -> &'static [usize] {
        match self {
            Direction::X => &[0],
            Direction::Y => &[1],
            Direction::Z => &[2],
            Direction::All => &[0, 1, 2],
        }
    }
}

impl FromStr for Direction {
    type Err = DiffusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "x" => Ok(Direction::X),
            "y" => Ok(Direction::Y),
            "z" => Ok(Direction::Z),
            "all" | "xyz" => Ok(Direction::All),
            _ => Err(DiffusionError::InvalidDirection(s.to_string())),
        }
    }
}

/// Boundary condition applied to the four faces parallel to the solve axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideBc {
    Periodic,
    Symmetric,
}

impl FromStr for SideBc {
    type Err = DiffusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "periodic" | "p" => Ok(SideBc::Periodic),
            "symmetric" | "s" | "mirror" => Ok(SideBc::Symmetric),
            _ => Err(DiffusionError::InvalidSideBc(s.to_string())),
        }
    }
}

/// Krylov method used for the linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    ConjugateGradient,
    BiCgStab,
}

impl FromStr for SolverKind {
    type Err = DiffusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "cg" | "conjugategradient" => Ok(SolverKind::ConjugateGradient),
            "bicgstab" | "bicg" | "biconjugategradientstabilized" => Ok(SolverKind::BiCgStab),
            _ => Err(DiffusionError::InvalidSolver(s.to_string())),
        }
    }
}

/// Flux-recovery variant of the anisotropic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// One-sided multi-point flux approximation.
    Mpfa,
    /// Symmetrized flux recovery; keeps the operator closer to symmetric.
    Empfa,
}

impl FromStr for Method {
    type Err = DiffusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "mpfa" | "mpfao" => Ok(Method::Mpfa),
            "empfa" => Ok(Method::Empfa),
            _ => Err(DiffusionError::InvalidMethod(s.to_string())),
        }
    }
}

/// Per-solve options shared by every engine.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub direction: Direction,
    pub side_bc: SideBc,
    pub solver: Option<SolverKind>,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// 0 resolves to the hardware parallelism.
    pub threads: usize,
    /// Iterations between progress log lines; 0 silences them.
    pub print_interval: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            direction: Direction::All,
            side_bc: SideBc::Periodic,
            solver: None,
            tolerance: 1e-6,
            max_iterations: 10_000,
            threads: 0,
            print_interval: 0,
        }
    }
}

impl SolveOptions {
    pub fn validate(&self) -> Result<(), DiffusionError> {
        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(DiffusionError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Options specific to the anisotropic engine.
#[derive(Debug, Clone)]
pub struct AnisotropicOptions {
    pub options: SolveOptions,
    pub method: Method,
    /// Optional fixed temperature layers on the two solve-axis faces,
    /// shaped like the cross-section. `None` means the affine profile values.
    pub prescribed_bc: Option<[Array2<f64>; 2]>,
}

impl Default for AnisotropicOptions {
    fn default() -> Self {
        Self {
            options: SolveOptions::default(),
            method: Method::Mpfa,
            prescribed_bc: None,
        }
    }
}
