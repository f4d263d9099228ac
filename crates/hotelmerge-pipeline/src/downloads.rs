//! In-flight image downloads for one batch.
//!
//! Tasks are spawned as URLs are discovered and joined once under a single
//! deadline. Dropping the set (early validation failure, deadline breach)
//! aborts whatever is still running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::BatchError;

pub(crate) struct Downloads {
    limiter: Arc<Semaphore>,
    tasks: JoinSet<bool>,
}

impl Downloads {
    /// At most `max_concurrent` downloads run at once; the rest wait for a permit.
    pub(crate) fn new(max_concurrent: usize) -> Self {
        Self {
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: JoinSet::new(),
        }
    }

    pub(crate) fn spawn<F>(&mut self, download: F)
    where
        F: Future<Output = bool> + Send + 'static,
    {
        let limiter = Arc::clone(&self.limiter);
        self.tasks.spawn(async move {
            let Ok(_permit) = limiter.acquire_owned().await else {
                return false;
            };
            download.await
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every download, then count the ones that succeeded.
    ///
    /// A panicked or cancelled task counts as a failed download.
    pub(crate) async fn join(mut self, deadline: Duration) -> Result<usize, BatchError> {
        let tasks = &mut self.tasks;
        tokio::time::timeout(deadline, async move {
            let mut succeeded = 0;
            while let Some(outcome) = tasks.join_next().await {
                if matches!(outcome, Ok(true)) {
                    succeeded += 1;
                }
            }
            succeeded
        })
        .await
        .map_err(|_| BatchError::DeadlineExceeded { deadline })
    }
}
