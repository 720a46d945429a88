//! Detached background work.
//!
//! Cache writes after a network-first fetch and stale-while-revalidate
//! refreshes run as spawned tasks the original request never joins. Each
//! task logs its own failure. The tracker only exists so a host can drain
//! outstanding work before shutdown, and so tests can observe its effects.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

#[derive(Clone, Debug, Default)]
pub struct Background {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` detached from the caller.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        let handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every tracked task, including tasks spawned while waiting.
    pub async fn settle(&self) {
        loop {
            let drained: Vec<_> = {
                let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
                handles.drain(..).collect()
            };

            if drained.is_empty() {
                return;
            }

            for handle in drained {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "background task panicked");
                }
            }
        }
    }
}
