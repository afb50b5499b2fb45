//! Duplicate call suppression
//!
//! [`SingleFlight`] collapses concurrent calls for the same key onto one
//! execution. The registry lock is held only while looking up or mutating the
//! map of in-flight operations, never while an operation runs.
//!
//! Each operation runs on its own tokio task, detached from the callers
//! awaiting it. Callers going away, even all of them, never cancel it; it runs
//! to completion and then removes itself from the registry, so a later call
//! always starts fresh instead of joining abandoned work.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{Instrument, debug, warn};

/// An in-flight operation ended without producing an output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("in-flight operation for '{key}' ended without a result: {reason}")]
pub struct FlightAborted {
    /// Registry key of the operation
    pub key: String,
    /// Why the task ended (panic or abort)
    pub reason: String,
}

type FlightOutput<T> = Shared<BoxFuture<'static, Result<T, FlightAborted>>>;
type Registry<T> = Arc<Mutex<HashMap<String, Flight<T>>>>;

struct Flight<T> {
    id: u64,
    output: FlightOutput<T>,
}

/// Removes a flight from the registry when its task ends, however it ends
struct Deregister<T> {
    registry: Registry<T>,
    key: String,
    id: u64,
}

impl<T> Drop for Deregister<T> {
    fn drop(&mut self) {
        let mut in_flight = self.registry.lock();
        if in_flight.get(&self.key).is_some_and(|f| f.id == self.id) {
            in_flight.remove(&self.key);
        }
    }
}

/// Keyed registry of in-flight operations
pub struct SingleFlight<T> {
    in_flight: Registry<T>,
    next_id: AtomicU64,
}

impl<T> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the operation built by `make`, or join the one already in flight for `key`
    ///
    /// `make` is only invoked when no operation for `key` is in flight. Every
    /// caller joined onto the same operation receives a clone of its output.
    ///
    /// # Errors
    ///
    /// Returns [`FlightAborted`] if the operation's task panicked or was aborted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> Result<T, FlightAborted>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let output = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(key) {
                debug!(key, "Joining in-flight operation");
                existing.output.clone()
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let output = self.spawn(key, id, make());
                in_flight.insert(key.to_owned(), Flight {
                    id,
                    output: output.clone(),
                });
                output
            }
        };

        output.await
    }

    /// Number of keys with an operation currently registered
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    // Called with the registry lock held; the task's guard cannot deregister
    // before the caller has inserted the flight.
    fn spawn<Fut>(&self, key: &str, id: u64, operation: Fut) -> FlightOutput<T>
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let guard = Deregister {
            registry: Arc::clone(&self.in_flight),
            key: key.to_owned(),
            id,
        };

        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                operation.await
            }
            .in_current_span(),
        );

        let key = key.to_owned();
        async move {
            handle.await.map_err(|e| {
                warn!(key = %key, error = %e, "In-flight operation ended without a result");
                FlightAborted {
                    key,
                    reason: e.to_string(),
                }
            })
        }
        .boxed()
        .shared()
    }
}
