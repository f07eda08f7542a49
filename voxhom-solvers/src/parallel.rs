//! Worker-pool sizing
//!
//! Every solve runs inside an explicitly constructed rayon pool sized from
//! the caller's thread count, instead of mutating any global scheduler state.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Requests above this are treated as "auto-detect".
pub const MAX_EXPLICIT_THREADS: usize = 1000;

/// Resolve a requested worker count: `0` or anything above
/// [`MAX_EXPLICIT_THREADS`] falls back to the number of available cores.
pub fn resolve_threads(requested: usize) -> usize {
    if requested == 0 || requested > MAX_EXPLICIT_THREADS {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested
    }
}

/// Build a dedicated pool for one solve.
pub fn build_pool(requested: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(resolve_threads(requested))
        .build()
}
