use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Runs type-universe scans off the calling task, at most `max_concurrent` at a time.
///
/// Each unit of work first acquires a slot, then runs on tokio's blocking pool. Callers
/// beyond the limit wait for a slot to free up.
#[derive(Debug)]
pub struct ScanPool {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ScanPool {
    /// Create a pool allowing `max_concurrent` scans at a time (at least one).
    #[must_use]
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        let max_concurrent = max_concurrent.max(1);
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        })
    }

    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Wait for a slot, then run `work` on the blocking pool.
    ///
    /// A panic inside `work` is reported as a [`JoinError`].
    pub async fn run<F, R>(&self, work: F) -> Result<R, JoinError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let _permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("semaphore is never closed");

        tokio::task::spawn_blocking(work).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use core::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn limits_concurrency() {
        let pool = ScanPool::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    pool.run(move || {
                        let current = active.fetch_add(1, Ordering::SeqCst) + 1;
                        _ = max_seen.fetch_max(current, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(10));
                        _ = active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
                })
            })
            .collect();

        for result in futures_util::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) <= 2);
        assert!(max_seen.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn zero_is_raised_to_one() {
        let pool = ScanPool::new(0);
        assert_eq!(pool.max_concurrent(), 1);
        assert_eq!(pool.run(|| 7).await.unwrap(), 7);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn panics_become_join_errors() {
        let pool = ScanPool::new(1);
        let err = pool.run(|| -> u32 { panic!("scan blew up") }).await.unwrap_err();
        assert!(err.is_panic());

        // The slot is released after a failed scan
        assert_eq!(pool.run(|| 1).await.unwrap(), 1);
    }
}
