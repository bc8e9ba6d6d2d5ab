//! In-memory DocumentStore for testing and development

use crate::core::collection::CollectionPath;
use crate::core::document::{Document, Fields};
use crate::core::error::{CrmError, Result, SubscriptionError, WriteError, WriteOperation};
use crate::core::events::{EventBus, StoreEvent};
use crate::core::service::{DocumentStore, SnapshotStream};
use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

type Partitions = HashMap<CollectionPath, IndexMap<String, Document>>;

/// In-memory document store
///
/// Documents are kept per [`CollectionPath`] in insertion order. Every write
/// publishes a [`StoreEvent`] on an internal [`EventBus`]; subscriptions
/// re-read the whole partition when an event for their path arrives.
///
/// Paths can be denied (emulating backend security rules) or marked
/// unavailable (emulating transient write failures).
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    partitions: RwLock<Partitions>,
    denied: RwLock<HashSet<CollectionPath>>,
    unavailable: RwLock<HashSet<CollectionPath>>,
    bus: EventBus,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_event_capacity(1024)
    }

    /// Create a store whose change feed buffers `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                partitions: RwLock::new(HashMap::new()),
                denied: RwLock::new(HashSet::new()),
                unavailable: RwLock::new(HashSet::new()),
                bus: EventBus::new(capacity),
            }),
        }
    }

    /// Reject reads and writes on a path
    pub fn deny(&self, path: &CollectionPath) {
        if let Ok(mut denied) = self.inner.denied.write() {
            denied.insert(path.clone());
        }
    }

    /// Lift a previous [`deny`](Self::deny)
    pub fn allow(&self, path: &CollectionPath) {
        if let Ok(mut denied) = self.inner.denied.write() {
            denied.remove(path);
        }
    }

    /// Make writes on a path fail with `WriteFailed`
    pub fn set_unavailable(&self, path: &CollectionPath, unavailable: bool) {
        if let Ok(mut paths) = self.inner.unavailable.write() {
            if unavailable {
                paths.insert(path.clone());
            } else {
                paths.remove(path);
            }
        }
    }

    /// Number of open subscriptions (plus any direct bus receivers)
    pub fn listener_count(&self) -> usize {
        self.inner.bus.receiver_count()
    }

    /// The change feed
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn read_partitions(&self) -> Result<RwLockReadGuard<'_, Partitions>> {
        self.inner
            .partitions
            .read()
            .map_err(|e| CrmError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_partitions(&self) -> Result<RwLockWriteGuard<'_, Partitions>> {
        self.inner
            .partitions
            .write()
            .map_err(|e| CrmError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn is_denied(&self, path: &CollectionPath) -> bool {
        self.inner
            .denied
            .read()
            .map(|denied| denied.contains(path))
            .unwrap_or(true)
    }

    fn check_write(&self, path: &CollectionPath, operation: WriteOperation) -> Result<()> {
        if self.is_denied(path) {
            return Err(WriteError::PermissionDenied {
                collection: path.collection,
                operation,
            }
            .into());
        }

        let unavailable = self
            .inner
            .unavailable
            .read()
            .map(|paths| paths.contains(path))
            .unwrap_or(false);
        if unavailable {
            return Err(WriteError::WriteFailed {
                collection: path.collection,
                operation,
                message: "backend unavailable".to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn snapshot(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        if self.is_denied(path) {
            return Err(SubscriptionError::Failed {
                collection: path.collection,
                message: "permission denied".to_string(),
            }
            .into());
        }

        let partitions = self.read_partitions()?;
        Ok(partitions
            .get(path)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, path: &CollectionPath, fields: Fields) -> Result<String> {
        self.check_write(path, WriteOperation::Add)?;

        let id = Uuid::new_v4().simple().to_string();
        self.write_partitions()?
            .entry(path.clone())
            .or_default()
            .insert(id.clone(), Document::new(id.clone(), fields));

        tracing::debug!(path = %path, document_id = %id, "Document added");
        self.inner.bus.publish(StoreEvent::Created {
            path: path.clone(),
            document_id: id.clone(),
        });

        Ok(id)
    }

    async fn update(&self, path: &CollectionPath, id: &str, patch: Fields) -> Result<()> {
        self.check_write(path, WriteOperation::Update)?;

        {
            let mut partitions = self.write_partitions()?;
            let document = partitions
                .get_mut(path)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| WriteError::NotFound {
                    collection: path.collection,
                    id: id.to_string(),
                })?;
            document.merge(patch);
        }

        tracing::debug!(path = %path, document_id = %id, "Document updated");
        self.inner.bus.publish(StoreEvent::Updated {
            path: path.clone(),
            document_id: id.to_string(),
        });

        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<()> {
        self.check_write(path, WriteOperation::Delete)?;

        let removed = self
            .write_partitions()?
            .get_mut(path)
            .and_then(|docs| docs.shift_remove(id));
        if removed.is_none() {
            return Err(WriteError::NotFound {
                collection: path.collection,
                id: id.to_string(),
            }
            .into());
        }

        tracing::debug!(path = %path, document_id = %id, "Document deleted");
        self.inner.bus.publish(StoreEvent::Deleted {
            path: path.clone(),
            document_id: id.to_string(),
        });

        Ok(())
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        self.snapshot(path)
    }

    fn subscribe(&self, path: &CollectionPath) -> SnapshotStream {
        // Register before reading so no write slips between snapshot and feed
        let receiver = self.inner.bus.subscribe();
        let initial = self.snapshot(path);
        if initial.is_err() {
            return stream::once(future::ready(initial)).boxed();
        }

        let store = self.clone();
        let path = path.clone();
        let updates = BroadcastStream::new(receiver).filter_map(move |item| {
            let snapshot = match item {
                Ok(envelope) if envelope.event.path() == &path => Some(store.snapshot(&path)),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        path = %path,
                        skipped = skipped,
                        "Snapshot feed lagged, re-reading collection"
                    );
                    Some(store.snapshot(&path))
                }
            };
            future::ready(snapshot)
        });

        stream::once(future::ready(initial)).chain(updates).boxed()
    }
}
