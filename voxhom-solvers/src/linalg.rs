//! Parallel vector kernels
//!
//! Dot products, norms and axpy-style updates over dense `f64` vectors,
//! dispatched across the ambient rayon pool in fixed-size chunks. The dot
//! products here are the only global synchronization points inside the
//! Krylov loops.

use ndarray::{Array1, Zip};
use rayon::prelude::*;

/// Chunk size for parallel reductions; large enough to amortize task
/// dispatch, small enough to balance across workers.
const CHUNK: usize = 8192;

/// Compute the inner product `(x, y) = Σ x_i · y_i`.
pub fn inner_product(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "vector lengths must match");
    match (x.as_slice(), y.as_slice()) {
        (Some(xs), Some(ys)) => xs
            .par_chunks(CHUNK)
            .zip(ys.par_chunks(CHUNK))
            .map(|(a, b)| a.iter().zip(b).map(|(u, v)| u * v).sum::<f64>())
            .sum(),
        _ => x.iter().zip(y.iter()).map(|(u, v)| u * v).sum(),
    }
}

/// Compute the 2-norm `‖x‖ = sqrt(Σ x_i²)`.
pub fn norm(x: &Array1<f64>) -> f64 {
    inner_product(x, x).sqrt()
}

/// In-place axpy: `y += α·x`.
pub fn axpy(alpha: f64, x: &Array1<f64>, y: &mut Array1<f64>) {
    debug_assert_eq!(x.len(), y.len(), "vector lengths must match");
    Zip::from(y).and(x).par_for_each(|yi, &xi| *yi += alpha * xi);
}

/// In-place xpby: `y = x + β·y`.
pub fn xpby(x: &Array1<f64>, beta: f64, y: &mut Array1<f64>) {
    debug_assert_eq!(x.len(), y.len(), "vector lengths must match");
    Zip::from(y).and(x).par_for_each(|yi, &xi| *yi = xi + beta * *yi);
}

/// Three-term update `out = a + α·(b + β·c)` used by the BiCGSTAB search
/// direction `p = r + β·(p − ω·v)`.
pub fn search_direction(r: &Array1<f64>, beta: f64, omega: f64, v: &Array1<f64>, p: &mut Array1<f64>) {
    debug_assert_eq!(r.len(), p.len());
    debug_assert_eq!(v.len(), p.len());
    Zip::from(p)
        .and(r)
        .and(v)
        .par_for_each(|pi, &ri, &vi| *pi = ri + beta * (*pi - omega * vi));
}

/// Elementwise `out = a − α·b`.
pub fn sub_scaled(a: &Array1<f64>, alpha: f64, b: &Array1<f64>, out: &mut Array1<f64>) {
    debug_assert_eq!(a.len(), out.len());
    debug_assert_eq!(b.len(), out.len());
    Zip::from(out)
        .and(a)
        .and(b)
        .par_for_each(|oi, &ai, &bi| *oi = ai - alpha * bi);
}
