//! Bounded worker pool for extraction tasks

use crate::{Result, ScanError};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

/// Runs submitted futures on the tokio runtime with bounded concurrency
///
/// Tasks are spawned immediately but each waits for a semaphore permit
/// before doing work, so at most `workers` tasks run at once. A panicking
/// task surfaces as a `JoinError` to whoever awaits its handle; the pool
/// itself keeps working.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    shut_down: AtomicBool,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with a fixed number of workers (at least 1)
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            active: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            shut_down: AtomicBool::new(false),
            workers,
        }
    }

    /// Create a pool sized to the machine's available parallelism
    pub fn with_default_parallelism() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);
        Self::new(workers)
    }

    /// Number of workers this pool was built with
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of submitted tasks not yet finished
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Submit a task; returns its join handle
    pub fn submit<F, T>(&self, future: F) -> Result<JoinHandle<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(ScanError::PoolShutDown);
        }

        self.active.fetch_add(1, Ordering::SeqCst);
        let semaphore = Arc::clone(&self.semaphore);
        let guard = ActiveGuard {
            active: Arc::clone(&self.active),
            idle: Arc::clone(&self.idle),
        };

        Ok(tokio::spawn(async move {
            // The acquire result is held, not unwrapped: the semaphore is
            // never closed, and holding the binding keeps the permit for
            // the lifetime of the task.
            let _permit = semaphore.acquire_owned().await;
            let _guard = guard;
            future.await
        }))
    }

    /// Wait until every submitted task has finished
    pub async fn wait_all(&self) {
        while self.active.load(Ordering::SeqCst) > 0 {
            // The timeout covers the race between the counter check and
            // waiter registration; a missed notify costs one tick, not a
            // hang.
            let _ = tokio::time::timeout(Duration::from_millis(50), self.idle.notified()).await;
        }
    }

    /// Refuse new submissions and wait for in-flight tasks
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.wait_all().await;
    }
}

struct ActiveGuard {
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let handle = pool
                .submit(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn wait_all_drains_the_pool() {
        let pool = WorkerPool::new(4);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.wait_all().await;
        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert_eq!(pool.active(), 0);
    }

    #[tokio::test]
    async fn submit_after_shutdown_fails() {
        let pool = WorkerPool::new(1);
        pool.shutdown().await;

        let result = pool.submit(async { 1 });
        assert!(matches!(result, Err(ScanError::PoolShutDown)));
    }

    #[tokio::test]
    async fn panic_does_not_poison_the_pool() {
        let pool = WorkerPool::new(1);

        let bad = pool.submit(async { panic!("boom") }).unwrap();
        assert!(bad.await.is_err());

        let good = pool.submit(async { 42 }).unwrap();
        assert_eq!(good.await.unwrap(), 42);
        pool.wait_all().await;
        assert_eq!(pool.active(), 0);
    }
}
