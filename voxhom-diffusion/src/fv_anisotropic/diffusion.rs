//! Per-axis anisotropic homogenization solve.

use ndarray::{Array1, Array2};

use solvers::{bicgstab, cg, BicgstabConfig, CgConfig};

use super::stencil::cross_axes;
use super::MpfaOperator;
use crate::config::{AnisotropicOptions, SolverKind};
use crate::error::DiffusionError;
use crate::fields::{flatten, linear_profile, unflatten};
use crate::grid::Grid3D;
use crate::homogenization::Homogenized;
use crate::materials::SymTensor3;

/// Homogenize along one axis with the multi-point flux engine. Returns the
/// full row of the effective tensor for that gradient direction, together
/// with the per-cell flux field.
pub fn solve_axis(
    grid: Grid3D,
    tensors: &[SymTensor3],
    axis: usize,
    aniso: &AnisotropicOptions,
) -> Result<Homogenized, DiffusionError> {
    let dims = grid.dims();
    for (d, &len) in dims.iter().enumerate() {
        if len < 3 {
            return Err(DiffusionError::DomainTooSmall { axis: d, len });
        }
    }

    let (c1, c2) = cross_axes(axis);
    let cross_dim = (dims[c1], dims[c2]);
    let extent = dims[axis] as f64 * grid.h;
    let (low, high) = match &aniso.prescribed_bc {
        Some([low, high]) => {
            if low.dim() != cross_dim || high.dim() != cross_dim {
                return Err(DiffusionError::PrescribedBcShape);
            }
            (low.clone(), high.clone())
        }
        None => (
            Array2::from_elem(cross_dim, 0.0),
            Array2::from_elem(cross_dim, extent),
        ),
    };

    let options = &aniso.options;
    let op = MpfaOperator::new(
        grid,
        tensors,
        axis,
        options.side_bc,
        aniso.method,
        &low,
        &high,
    );

    let t0 = flatten(&linear_profile(&grid, axis));
    let mut b = op.residual_affine(&t0);
    b.mapv_inplace(|v| -v);

    let mut u = Array1::zeros(grid.len());
    let solver = options.solver.unwrap_or(SolverKind::BiCgStab);
    let outcome = match solver {
        SolverKind::ConjugateGradient => {
            let config = CgConfig {
                max_iterations: options.max_iterations,
                tolerance: options.tolerance,
                print_interval: options.print_interval,
            };
            cg(&op, &mut u, Some(&b), &config)
        }
        SolverKind::BiCgStab => {
            let config = BicgstabConfig {
                max_iterations: options.max_iterations,
                tolerance: options.tolerance,
                print_interval: options.print_interval,
            };
            bicgstab(&op, &mut u, Some(&b), &config)
        }
    };
    if let Some(reason) = outcome.breakdown {
        return Err(DiffusionError::Breakdown {
            solver: match solver {
                SolverKind::ConjugateGradient => "cg",
                SolverKind::BiCgStab => "bicgstab",
            },
            reason: reason.to_string(),
            iterations: outcome.iterations,
        });
    }

    let t = &t0 + &u;
    let flux = op.flux_field(&t);
    let cells = grid.len() as f64;
    let mut coefficient = [0.0f64; 3];
    for q in &flux {
        for a in 0..3 {
            coefficient[a] -= q[a];
        }
    }
    for c in &mut coefficient {
        *c /= cells;
    }

    Ok(Homogenized {
        axis,
        coefficient,
        field: unflatten(&grid, &t),
        flux: Some(flux),
        iterations: outcome.iterations,
        residual: outcome.residual,
        converged: outcome.converged,
    })
}
