// ── Deferred follow-up tasks ──
//
// Operations schedule follow-ups (a health check after a create, a
// reconcile after a mapping change) without awaiting them. Each task
// sleeps its delay on the tokio clock, then runs unless cancelled.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to one pending follow-up.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    label: &'static str,
    token: CancellationToken,
}

impl ScheduledTask {
    /// Stop the task if it has not started running yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

pub struct Scheduler {
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Tasks are cancelled together when `parent` is.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            cancel: parent.child_token(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Run `task` after `delay`. Must be called within a tokio runtime.
    pub fn schedule<F>(&self, label: &'static str, delay: Duration, task: F) -> ScheduledTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.cancel.child_token();
        let waiter = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = waiter.cancelled() => {
                    debug!(label, "deferred task cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    debug!(label, "running deferred task");
                    task.await;
                }
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);

        ScheduledTask { label, token }
    }

    /// Number of tasks not yet finished.
    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|h| !h.is_finished());
        tasks.len()
    }

    /// Wait for every outstanding task, including ones scheduled by
    /// tasks that finish while draining.
    pub async fn drain(&self) {
        loop {
            let batch: Vec<JoinHandle<()>> = {
                let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *tasks)
            };
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    debug!(error = %e, "deferred task did not complete");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn runs_only_after_delay() {
        let scheduler = Scheduler::new(&CancellationToken::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        scheduler.schedule("count", Duration::from_millis(1000), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let scheduler = Scheduler::new(&CancellationToken::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let task = scheduler.schedule("count", Duration::from_millis(500), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        task.cancel();
        scheduler.drain().await;

        assert!(task.is_cancelled());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_everything() {
        let parent = CancellationToken::new();
        let scheduler = Scheduler::new(&parent);
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&hits);
            scheduler.schedule("count", Duration::from_secs(1), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        parent.cancel();
        scheduler.drain().await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_pending_work() {
        let scheduler = Scheduler::new(&CancellationToken::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        scheduler.schedule("count", Duration::from_millis(750), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.drain().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
