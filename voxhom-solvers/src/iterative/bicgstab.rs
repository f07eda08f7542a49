//! BiCGSTAB (Bi-Conjugate Gradient Stabilized) solver
//!
//! Krylov solver for general (non-symmetric) operators; the explicit-jump
//! interface operator and the anisotropic MPFA operator are solved with it.
//! Detects the classical breakdown conditions and reports them instead of
//! dividing by zero.

use super::{Breakdown, SolveOutcome, BREAKDOWN_EPS};
use crate::linalg::{inner_product, norm, search_direction, sub_scaled};
use crate::traits::LinearOperator;
use ndarray::{Array1, Zip};
use std::time::Instant;

/// BiCGSTAB solver configuration
#[derive(Debug, Clone)]
pub struct BicgstabConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Absolute residual norm for convergence
    pub tolerance: f64,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for BicgstabConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-8,
            print_interval: 0,
        }
    }
}

/// Solve `A·x = b` with BiCGSTAB.
///
/// Same contract as [`cg`](crate::iterative::cg::cg): `x` carries the initial
/// guess in and the solution out, `b = None` means the zero right-hand side.
/// On `ρ = 0`, `(r̃, A·p) = 0` or `ω = 0` the solve aborts immediately with
/// the breakdown recorded in the outcome.
pub fn bicgstab<A: LinearOperator>(
    op: &A,
    x: &mut Array1<f64>,
    b: Option<&Array1<f64>>,
    config: &BicgstabConfig,
) -> SolveOutcome {
    debug_assert_eq!(x.len(), op.len(), "guess length must match operator");
    let n = op.len();
    let start = Instant::now();

    let mut r = op.apply(x);
    match b {
        Some(b) => {
            debug_assert_eq!(b.len(), n, "rhs length must match operator");
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

    // Shadow residual, fixed at the initial residual.
    let r0 = r.clone();

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    let mut p: Array1<f64> = Array1::zeros(n);
    let mut v: Array1<f64> = Array1::zeros(n);
    let mut s: Array1<f64> = Array1::zeros(n);
    let mut t: Array1<f64> = Array1::zeros(n);

    let abort = |iter: usize, residual: f64, reason: Breakdown| {
        log::warn!("BiCGSTAB breakdown at iteration {}: {}", iter, reason);
        SolveOutcome {
            iterations: iter,
            residual,
            converged: false,
            breakdown: Some(reason),
        }
    };

    for iter in 0..config.max_iterations {
        let rho_new = inner_product(&r0, &r);
        if rho_new.abs() < BREAKDOWN_EPS {
            return abort(iter, r_norm, Breakdown::Rho);
        }

        let beta = (rho_new / rho) * (alpha / omega);
        rho = rho_new;

        // p = r + beta * (p - omega * v)
        search_direction(&r, beta, omega, &v, &mut p);

        op.apply_into(&p, &mut v);

        let r0v = inner_product(&r0, &v);
        if r0v.abs() < BREAKDOWN_EPS {
            return abort(iter, r_norm, Breakdown::SearchCollapse);
        }
        alpha = rho / r0v;

        // s = r - alpha * v
        sub_scaled(&r, alpha, &v, &mut s);

        let s_norm = norm(&s);
        if s_norm < config.tolerance {
            crate::linalg::axpy(alpha, &p, x);
            return SolveOutcome {
                iterations: iter + 1,
                residual: s_norm,
                converged: true,
                breakdown: None,
            };
        }

        op.apply_into(&s, &mut t);

        let tt = inner_product(&t, &t);
        if tt.abs() < BREAKDOWN_EPS {
            return abort(iter, s_norm, Breakdown::Omega);
        }
        omega = inner_product(&t, &s) / tt;

        // x += alpha * p + omega * s
        Zip::from(&mut *x)
            .and(&p)
            .and(&s)
            .par_for_each(|xi, &pi, &si| *xi += alpha * pi + omega * si);

        // r = s - omega * t
        sub_scaled(&s, omega, &t, &mut r);

        r_norm = norm(&r);
        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::info!(
                "BiCGSTAB iteration {}: residual = {:.6e} ({:.3}s)",
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

        if omega.abs() < BREAKDOWN_EPS {
            return abort(iter + 1, r_norm, Breakdown::Omega);
        }
    }

    log::warn!(
        "BiCGSTAB did not converge after {} iterations (residual {:.6e})",
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
