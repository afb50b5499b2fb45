//! Background task queue for fire-and-forget work
//!
//! Work handed to [`BackgroundTasks`] runs on the tokio runtime detached from
//! whoever spawned it, but stays tracked so shutdown can wait for it with a
//! bound instead of losing it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, warn};

/// Interval between checks while draining
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct TrackedTask {
    id: u64,
    kind: &'static str,
    handle: JoinHandle<()>,
}

/// Tracks detached background tasks
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    tasks: Mutex<Vec<TrackedTask>>,
    next_id: AtomicU64,
}

impl BackgroundTasks {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task on the current tokio runtime
    ///
    /// `kind` labels the task in tracing output. Returns the task id.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<F>(&self, kind: &'static str, task: F) -> u64
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(task.instrument(debug_span!("background_task", kind, id)));

        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.handle.is_finished());
        tasks.push(TrackedTask { id, kind, handle });
        debug!(kind, id, pending = tasks.len(), "Background task spawned");

        id
    }

    /// Number of tasks that have not finished yet
    pub fn active_count(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    /// Wait for all tracked tasks to finish, up to `timeout`
    ///
    /// Returns `true` if everything finished in time. Tasks still running when
    /// the bound elapses are left running and stay tracked.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                {
                    let mut tasks = self.tasks.lock();
                    tasks.retain(|t| !t.handle.is_finished());
                    if tasks.is_empty() {
                        break;
                    }
                }
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        };

        let drained = tokio::time::timeout(timeout, wait).await.is_ok();
        if !drained {
            warn!(
                pending = self.active_count(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Background tasks still running after drain timeout"
            );
        }
        drained
    }

    /// Abort every tracked task
    pub fn abort_all(&self) {
        let mut tasks = self.tasks.lock();
        for task in tasks.drain(..) {
            debug!(kind = task.kind, id = task.id, "Aborting background task");
            task.handle.abort();
        }
    }
}
