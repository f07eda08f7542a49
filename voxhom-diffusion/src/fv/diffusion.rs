//! Per-axis finite-volume homogenization solve.

use ndarray::{Array1, Array3};

use solvers::{bicgstab, cg, BicgstabConfig, CgConfig};

use crate::boundary::axis_boundaries;
use crate::config::{SolveOptions, SolverKind};
use crate::error::DiffusionError;
use crate::fields::{linear_profile, unflatten, view3_mut};
use crate::grid::Grid3D;
use crate::homogenization::Homogenized;
use crate::fv::FvOperator;

/// Homogenize along one axis: apply a unit temperature gradient via the
/// affine profile, solve for the correction field, average the face fluxes.
pub fn solve_axis(
    grid: Grid3D,
    cond: &Array3<f64>,
    axis: usize,
    options: &SolveOptions,
) -> Result<Homogenized, DiffusionError> {
    let extent = grid.dims()[axis] as f64 * grid.h;
    // Same stencil twice: once with the physical face values for the affine
    // right-hand side and the flux average, once homogeneous for the solve.
    let affine = FvOperator::new(
        grid,
        cond,
        axis_boundaries(axis, options.side_bc, 0.0, extent),
    );
    let hom = FvOperator::new(grid, cond, axis_boundaries(axis, options.side_bc, 0.0, 0.0));

    let t0 = linear_profile(&grid, axis);
    let mut b = Array1::zeros(grid.len());
    affine.apply_field(t0.view(), view3_mut(&grid, &mut b));
    b.mapv_inplace(|v| -v);

    let mut u = Array1::zeros(grid.len());
    let outcome = match options.solver.unwrap_or(SolverKind::ConjugateGradient) {
        SolverKind::ConjugateGradient => {
            let config = CgConfig {
                max_iterations: options.max_iterations,
                tolerance: options.tolerance,
                print_interval: options.print_interval,
            };
            cg(&hom, &mut u, Some(&b), &config)
        }
        SolverKind::BiCgStab => {
            let config = BicgstabConfig {
                max_iterations: options.max_iterations,
                tolerance: options.tolerance,
                print_interval: options.print_interval,
            };
            bicgstab(&hom, &mut u, Some(&b), &config)
        }
    };
    if let Some(reason) = outcome.breakdown {
        return Err(DiffusionError::Breakdown {
            solver: match options.solver.unwrap_or(SolverKind::ConjugateGradient) {
                SolverKind::ConjugateGradient => "cg",
                SolverKind::BiCgStab => "bicgstab",
            },
            reason: reason.to_string(),
            iterations: outcome.iterations,
        });
    }

    let field = &t0 + &unflatten(&grid, &u);
    let coefficient = affine.face_flux_mean(field.view());
    Ok(Homogenized {
        axis,
        coefficient,
        field,
        flux: None,
        iterations: outcome.iterations,
        residual: outcome.residual,
        converged: outcome.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SideBc;
    use approx::assert_abs_diff_eq;

    fn options() -> SolveOptions {
        SolveOptions {
            tolerance: 1e-10,
            ..SolveOptions::default()
        }
    }

    #[test]
    fn homogeneous_medium_recovers_the_conductivity() {
        let grid = Grid3D::new(4, 5, 3, 0.5);
        let cond = Array3::from_elem((4, 5, 3), 2.5);
        for axis in 0..3 {
            let r = solve_axis(grid, &cond, axis, &options()).unwrap();
            assert!(r.converged);
            assert_abs_diff_eq!(r.coefficient[axis], 2.5, epsilon = 1e-8);
        }
    }

    #[test]
    fn series_laminate_gives_harmonic_mean() {
        // layers normal to x with k = 1 and k = 3, solve along x
        let grid = Grid3D::new(4, 2, 2, 1.0);
        let cond = Array3::from_shape_fn((4, 2, 2), |(i, _, _)| if i % 2 == 0 { 1.0 } else { 3.0 });
        let r = solve_axis(grid, &cond, 0, &options()).unwrap();
        assert!(r.converged);
        assert_abs_diff_eq!(r.coefficient[0], 1.5, epsilon = 1e-8);
    }

    #[test]
    fn parallel_laminate_gives_arithmetic_mean() {
        // layers normal to y, solve along x: slabs conduct side by side
        let grid = Grid3D::new(4, 4, 2, 1.0);
        let cond = Array3::from_shape_fn((4, 4, 2), |(_, j, _)| if j % 2 == 0 { 1.0 } else { 3.0 });
        let r = solve_axis(grid, &cond, 0, &options()).unwrap();
        assert!(r.converged);
        assert_abs_diff_eq!(r.coefficient[0], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn symmetric_sides_match_periodic_for_laminates() {
        let grid = Grid3D::new(4, 2, 2, 1.0);
        let cond = Array3::from_shape_fn((4, 2, 2), |(i, _, _)| if i < 2 { 1.0 } else { 4.0 });
        let opts = SolveOptions {
            side_bc: SideBc::Symmetric,
            ..options()
        };
        let r = solve_axis(grid, &cond, 0, &opts).unwrap();
        assert_abs_diff_eq!(r.coefficient[0], 1.6, epsilon = 1e-8);
    }

    #[test]
    fn zero_iteration_budget_reports_non_convergence() {
        let grid = Grid3D::new(3, 3, 3, 1.0);
        let cond = Array3::from_shape_fn((3, 3, 3), |(i, j, k)| 1.0 + ((i + j + k) % 2) as f64);
        let opts = SolveOptions {
            max_iterations: 0,
            ..options()
        };
        let r = solve_axis(grid, &cond, 0, &opts).unwrap();
        assert!(!r.converged);
        assert_eq!(r.iterations, 0);
    }
}
