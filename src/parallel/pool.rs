//! Thread budget for `debrief batch`.
//!
//! Each debriefing file is linked on its own rayon task; this only decides how many OS threads
//! those tasks share. `--workers 0` (the default) leaves the choice to rayon's global pool.

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Threads used for log analysis; 0 means one per CPU core.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Run `analyze` on a dedicated pool sized to [workers](WorkerPool::workers), or on the global
    /// pool when no size was requested. Building a dedicated pool can fail when the OS refuses
    /// to spawn threads.
    pub fn install<F, R>(&self, analyze: F) -> Result<R, ThreadPoolBuildError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self.workers {
            0 => Ok(analyze()),
            n => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|idx| format!("debrief-worker-{idx}"))
                    .build()?;
                Ok(pool.install(analyze))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_pool_runs_on_requested_thread_count() {
        let threads = WorkerPool::with_workers(3)
            .install(rayon::current_num_threads)
            .expect("pool");
        assert_eq!(threads, 3);
    }

    #[test]
    fn default_pool_uses_global_rayon_pool() {
        let threads = WorkerPool::default()
            .install(rayon::current_num_threads)
            .expect("pool");
        assert!(threads >= 1);
    }
}
