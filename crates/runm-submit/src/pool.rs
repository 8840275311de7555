use std::sync::mpsc;

use runm_core::errors::{ErrorInfo, RunmError};

/// Fixed-size pool executing submit commands.
///
/// At most `size` tasks run at once; further tasks queue inside the pool.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

impl WorkerPool {
    /// Builds a pool with `size` worker threads.
    pub fn new(size: usize) -> Result<Self, RunmError> {
        let size = size.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|index| format!("runm-worker-{index}"))
            .panic_handler(|_| tracing::error!("submit worker panicked"))
            .build()
            .map_err(|err| RunmError::Submission(ErrorInfo::new("thread_pool", err.to_string())))?;
        Ok(Self { pool, size })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues `task` and returns a handle to its eventual result.
    pub fn submit<T, F>(&self, task: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        self.pool.spawn(move || {
            // The receiver may be gone after an aborted submission.
            let _ = tx.send(task());
        });
        JobHandle { rx }
    }
}

/// Future-like handle for one queued task.
pub struct JobHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks until the task finishes.
    pub fn wait(self) -> Result<T, RunmError> {
        self.rx.recv().map_err(|_| {
            RunmError::Submission(ErrorInfo::new(
                "worker_lost",
                "submit worker exited without a result",
            ))
        })
    }
}
