//! Cancellation handle for one collection subscription

use crate::core::collection::Collection;
use tokio::task::JoinHandle;

/// Owns the task pumping one collection feed into the view state
///
/// Dropping the handle aborts the task, which drops the feed and releases
/// the backend listener. [`shutdown`](Self::shutdown) does the same and
/// waits until the listener is gone.
#[derive(Debug)]
pub struct SubscriptionHandle {
    collection: Collection,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn new(collection: Collection, task: JoinHandle<()>) -> Self {
        Self {
            collection,
            task: Some(task),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Whether the feed has ended (closed by the backend or failed)
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Abort the pump and wait for it to be dropped
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancelled is the expected outcome
            let _ = task.await;
            tracing::debug!(collection = %self.collection, "Subscription released");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
