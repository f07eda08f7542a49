//! CG (Conjugate Gradient) solver
//!
//! The method of choice for symmetric definite systems; the finite-volume
//! diffusion operator with fixed-value faces is one, so CG is the default
//! there. Works equally for negative definite operators (the iterates are
//! identical to CG on the negated system).

use super::{Breakdown, SolveOutcome, BREAKDOWN_EPS};
use crate::linalg::{axpy, inner_product, norm, xpby};
use crate::traits::LinearOperator;
use ndarray::Array1;
use std::time::Instant;

/// CG solver configuration
#[derive(Debug, Clone)]
pub struct CgConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Absolute residual norm for convergence
    pub tolerance: f64,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-8,
            print_interval: 0,
        }
    }
}

/// Solve `A·x = b` with the Conjugate Gradient method.
///
/// `x` holds the initial guess on entry and the solution on exit. `b = None`
/// solves against the zero right-hand side (used for the fluctuation part of
/// the homogenization problem, where the non-trivial content lives in the
/// initial guess). Non-convergence after `max_iterations` is reported in the
/// outcome and logged as a warning, not treated as fatal.
pub fn cg<A: LinearOperator>(
    op: &A,
    x: &mut Array1<f64>,
    b: Option<&Array1<f64>>,
    config: &CgConfig,
) -> SolveOutcome {
    debug_assert_eq!(x.len(), op.len(), "guess length must match operator");
    let start = Instant::now();

    let mut r = op.apply(x);
    match b {
        Some(b) => {
            debug_assert_eq!(b.len(), op.len(), "rhs length must match operator");
            r.zip_mut_with(b, |ri, &bi| *ri = bi - *ri);
        }
        None => r.mapv_inplace(|ri| -ri),
    }

    let mut r_norm = norm(&r);
    if r_norm < config.tolerance {
        return SolveOutcome {
            iterations: 0,
            residual: r_norm,
            converged: true,
            breakdown: None,
        };
    }

    let mut p = r.clone();
    let mut q = Array1::zeros(op.len());
    let mut rho = r_norm * r_norm;

    for iter in 0..config.max_iterations {
        op.apply_into(&p, &mut q);

        let pq = inner_product(&p, &q);
        if pq.abs() < BREAKDOWN_EPS {
            log::warn!("CG breakdown at iteration {}: (p, A·p) vanished", iter);
            return SolveOutcome {
                iterations: iter,
                residual: r_norm,
                converged: false,
                breakdown: Some(Breakdown::SearchCollapse),
            };
        }

        let alpha = rho / pq;
        axpy(alpha, &p, x);
        axpy(-alpha, &q, &mut r);

        r_norm = norm(&r);
        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::info!(
                "CG iteration {}: residual = {:.6e} ({:.3}s)",
                iter + 1,
                r_norm,
                start.elapsed().as_secs_f64()
            );
        }

        if r_norm < config.tolerance {
            return SolveOutcome {
                iterations: iter + 1,
                residual: r_norm,
                converged: true,
                breakdown: None,
            };
        }

        let rho_new = r_norm * r_norm;
        if rho.abs() < BREAKDOWN_EPS {
            log::warn!("CG breakdown at iteration {}: rho vanished", iter);
            return SolveOutcome {
                iterations: iter + 1,
                residual: r_norm,
                converged: false,
                breakdown: Some(Breakdown::Rho),
            };
        }
        let beta = rho_new / rho;
        rho = rho_new;

        xpby(&r, beta, &mut p);
    }

    log::warn!(
        "CG did not converge after {} iterations (residual {:.6e})",
        config.max_iterations,
        r_norm
    );
    SolveOutcome {
        iterations: config.max_iterations,
        residual: r_norm,
        converged: false,
        breakdown: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DenseMatrix;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn cg_spd() {
        let a = DenseMatrix::new(array![[4.0, 1.0], [1.0, 3.0]]);
        let b = array![1.0, 2.0];
        let mut x = Array1::zeros(2);

        let config = CgConfig {
            max_iterations: 100,
            tolerance: 1e-12,
            print_interval: 0,
        };
        let outcome = cg(&a, &mut x, Some(&b), &config);

        assert!(outcome.converged, "CG should converge for SPD matrix");
        let ax = a.apply(&x);
        assert_relative_eq!(ax[0], b[0], epsilon = 1e-9);
        assert_relative_eq!(ax[1], b[1], epsilon = 1e-9);
    }

    #[test]
    fn cg_negative_definite() {
        let a = DenseMatrix::new(array![[-4.0, -1.0], [-1.0, -3.0]]);
        let b = array![1.0, 2.0];
        let mut x = Array1::zeros(2);
        let outcome = cg(&a, &mut x, Some(&b), &CgConfig::default());
        assert!(outcome.converged);
        let ax = a.apply(&x);
        assert_relative_eq!(ax[0], b[0], epsilon = 1e-7);
        assert_relative_eq!(ax[1], b[1], epsilon = 1e-7);
    }

    #[test]
    fn cg_honors_initial_guess() {
        let a = DenseMatrix::new(array![[4.0, 1.0], [1.0, 3.0]]);
        let b = array![1.0, 2.0];
        let mut x = Array1::zeros(2);
        cg(&a, &mut x, Some(&b), &CgConfig::default());

        // Re-running from the converged solution takes no extra iterations.
        let again = cg(&a, &mut x, Some(&b), &CgConfig::default());
        assert!(again.converged);
        assert_eq!(again.iterations, 0);
    }

    #[test]
    fn cg_zero_max_iterations_fails_cleanly() {
        let a = DenseMatrix::new(array![[4.0, 1.0], [1.0, 3.0]]);
        let b = array![1.0, 2.0];
        let mut x = Array1::zeros(2);
        let config = CgConfig {
            max_iterations: 0,
            ..CgConfig::default()
        };
        let outcome = cg(&a, &mut x, Some(&b), &config);
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn cg_zero_rhs_decays_guess() {
        let a = DenseMatrix::new(array![[4.0, 1.0], [1.0, 3.0]]);
        let mut x = array![1.0, -2.0];
        let outcome = cg(&a, &mut x, None, &CgConfig::default());
        assert!(outcome.converged);
        assert_relative_eq!(x[0], 0.0, epsilon = 1e-7);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-7);
    }
}
