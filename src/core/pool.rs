//! Bounded worker pools shared by both pipelines.
//!
//! Each run builds its own rayon pool so the worker bound is exact and
//! independent of the global pool.

use crate::error::PrepError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;

/// Default number of concurrent copies in the collect pipeline
pub const DEFAULT_COPY_WORKERS: usize = 20;

/// Default number of concurrent normalizations: one per available core
pub fn default_crop_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Build a pool with exactly `max_workers` threads named `{label}-{index}`
pub(crate) fn build_pool(max_workers: usize, label: &str) -> Result<ThreadPool, PrepError> {
    if max_workers == 0 {
        return Err(PrepError::Config(
            "worker count must be at least 1".to_string(),
        ));
    }

    let label = label.to_string();
    ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .thread_name(move |index| format!("{label}-{index}"))
        .build()
        .map_err(|e| PrepError::WorkerPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_has_requested_size() {
        let pool = build_pool(3, "test").unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn zero_workers_is_a_config_error() {
        assert!(matches!(build_pool(0, "test"), Err(PrepError::Config(_))));
    }

    #[test]
    fn default_crop_workers_is_positive() {
        assert!(default_crop_workers() >= 1);
    }
}
