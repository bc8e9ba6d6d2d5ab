//! Realtime sync layer
//!
//! [`RealtimeSync::open`] opens one subscription per collection for the
//! signed-in user and pumps every snapshot into a shared [`ViewState`]
//! published on a `tokio::sync::watch` channel.
//!
//! ```text
//! Repository<Client>::subscribe() ──▶ pump ──┐
//! Repository<Payment>::subscribe() ─▶ pump ──┤
//! ...                                        ├──▶ watch::Sender<ViewState> ──▶ sections, generator
//! Repository<Notification>::subscribe() ▶ ───┘
//! ```
//!
//! A failing subscription marks its own collection as failed and leaves
//! the others running. Teardown goes through [`RealtimeSync::close`] or,
//! as a fallback, `Drop` of the [`SubscriptionHandle`]s.

mod handle;
mod view;

pub use handle::SubscriptionHandle;
pub use view::{ViewSlot, ViewState, collation_key};

use crate::core::collection::Collection;
use crate::repository::{Repositories, Repository};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// The five live subscriptions of one workspace
pub struct RealtimeSync {
    state: Arc<watch::Sender<ViewState>>,
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl RealtimeSync {
    /// Open all five subscriptions
    ///
    /// Must be called from within a tokio runtime. Listeners are registered
    /// before this returns.
    pub fn open(repos: &Repositories) -> Self {
        let (sender, _) = watch::channel(ViewState::default());
        let state = Arc::new(sender);

        let handles = vec![
            pump(&repos.clients, state.clone()),
            pump(&repos.payments, state.clone()),
            pump(&repos.taxes, state.clone()),
            pump(&repos.tasks, state.clone()),
            pump(&repos.notifications, state.clone()),
        ];
        tracing::debug!(user_id = %repos.user_id, "Realtime sync opened");

        Self {
            state,
            handles: Mutex::new(handles),
        }
    }

    /// Read-only view of the state
    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub(crate) fn record_write_error(&self, collection: Collection, message: String) {
        self.state
            .send_modify(|state| state.record_write_error(collection, message));
    }

    pub(crate) fn clear_write_error(&self, collection: Collection) {
        self.state.send_if_modified(|state| {
            let had_error = state.write_error(collection).is_some();
            state.clear_write_error(collection);
            had_error
        });
    }

    /// Number of subscriptions still held
    pub fn open_subscriptions(&self) -> usize {
        self.handles.lock().map(|handles| handles.len()).unwrap_or(0)
    }

    /// Release every subscription and wait until the listeners are gone
    ///
    /// Idempotent.
    pub async fn close(&self) {
        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        if handles.is_empty() {
            return;
        }

        for handle in handles {
            handle.shutdown().await;
        }
        tracing::debug!("Realtime sync closed");
    }
}

fn pump<T: ViewSlot>(
    repo: &Repository<T>,
    state: Arc<watch::Sender<ViewState>>,
) -> SubscriptionHandle {
    let collection = T::COLLECTION;
    let mut feed = repo.subscribe();

    let task = tokio::spawn(async move {
        while let Some(snapshot) = feed.next().await {
            match snapshot {
                Ok(records) => {
                    tracing::debug!(
                        collection = %collection,
                        count = records.len(),
                        "Snapshot applied"
                    );
                    state.send_modify(|state| state.apply(records));
                }
                Err(e) => {
                    tracing::error!(collection = %collection, error = %e, "Subscription failed");
                    state.send_modify(|state| state.fail(collection, e.user_message()));
                }
            }
        }
        tracing::debug!(collection = %collection, "Subscription feed ended");
    });

    SubscriptionHandle::new(collection, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::CollectionPath;
    use crate::entities::Client;
    use crate::storage::InMemoryDocumentStore;

    async fn wait_for<F>(view: &mut watch::Receiver<ViewState>, mut done: F) -> ViewState
    where
        F: FnMut(&ViewState) -> bool,
    {
        view.wait_for(|state| done(state)).await.unwrap().clone()
    }

    #[tokio::test]
    async fn test_open_loads_every_collection() {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "app", "u1");
        repos.clients.add(&Client::new("Acme", "B1")).await.unwrap();

        let sync = RealtimeSync::open(&repos);
        assert_eq!(store.listener_count(), 5);

        let mut view = sync.view();
        let state = wait_for(&mut view, |s| !s.is_loading()).await;
        assert_eq!(state.clients.len(), 1);
        assert!(state.payments.is_empty());

        sync.close().await;
    }

    #[tokio::test]
    async fn test_snapshot_follows_writes() {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "app", "u1");
        let sync = RealtimeSync::open(&repos);
        let mut view = sync.view();
        wait_for(&mut view, |s| !s.is_loading()).await;

        let id = repos.clients.add(&Client::new("Acme", "B1")).await.unwrap();
        let state = wait_for(&mut view, |s| s.clients.len() == 1).await;
        assert_eq!(state.clients[0].id, id);

        repos.clients.delete(&id).await.unwrap();
        let state = wait_for(&mut view, |s| s.clients.is_empty()).await;
        assert_eq!(state.revision(Collection::Clients), 3);

        sync.close().await;
    }

    #[tokio::test]
    async fn test_one_failed_subscription_leaves_others_running() {
        let store = InMemoryDocumentStore::new();
        store.deny(&CollectionPath::new("app", "u1", Collection::Taxes));
        let repos = Repositories::new(Arc::new(store.clone()), "app", "u1");

        let sync = RealtimeSync::open(&repos);
        let mut view = sync.view();
        let state = wait_for(&mut view, |s| !s.is_loading()).await;
        assert_eq!(
            state.load_error(Collection::Taxes),
            Some("Could not load taxes data.")
        );
        assert_eq!(state.load_error(Collection::Clients), None);

        repos.clients.add(&Client::new("Acme", "B1")).await.unwrap();
        wait_for(&mut view, |s| s.clients.len() == 1).await;

        sync.close().await;
    }

    #[tokio::test]
    async fn test_close_releases_all_listeners() {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "app", "u1");
        let sync = RealtimeSync::open(&repos);
        assert_eq!(sync.open_subscriptions(), 5);

        sync.close().await;
        assert_eq!(store.listener_count(), 0);
        assert_eq!(sync.open_subscriptions(), 0);

        // Second close is a no-op
        sync.close().await;
    }
}
