use crate::config::EngineConfig;

/// Worker pool sized by [`EngineConfig::worker_threads`].
///
/// Built once, on the first call that fans out; `None` means run sequentially.
#[cfg(feature = "parallel")]
static POOL: std::sync::OnceLock<Option<rayon::ThreadPool>> = std::sync::OnceLock::new();

#[cfg(feature = "parallel")]
fn pool() -> Option<&'static rayon::ThreadPool> {
    POOL.get_or_init(|| {
        let threads = EngineConfig::global().worker_threads();
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tidyframe-{i}"))
            .build()
            .map_err(|err| {
                tracing::warn!(error = %err, threads, "thread pool unavailable, running sequentially")
            })
            .ok()
    })
    .as_ref()
}

/// Map `f` over `items`, in parallel once `items.len() >= threshold`.
///
/// Output order always matches input order.
pub(crate) fn map_collect<T, R, F>(items: &[T], threshold: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if EngineConfig::global().parallel && items.len() >= threshold && items.len() > 1 {
        if let Some(pool) = pool() {
            use rayon::prelude::*;
            tracing::trace!(items = items.len(), "parallel map");
            return pool.install(|| items.par_iter().map(&f).collect());
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = threshold;
    items.iter().map(f).collect()
}

/// Run two closures, concurrently when `parallel` is true and a pool exists.
pub(crate) fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    #[cfg(feature = "parallel")]
    if parallel && EngineConfig::global().parallel {
        if let Some(pool) = pool() {
            return pool.join(a, b);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    (a(), b())
}

/// Threshold for per-group fan-out.
pub(crate) fn min_groups() -> usize {
    EngineConfig::global().parallel_min_groups
}

/// Threshold for per-row fan-out.
pub(crate) fn min_rows() -> usize {
    EngineConfig::global().parallel_min_rows
}
