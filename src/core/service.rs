//! Backend document store contract

use crate::core::collection::CollectionPath;
use crate::core::document::{Document, Fields};
use crate::core::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of full collection snapshots
///
/// Yields the current contents once on open and again after every change.
/// Dropping the stream releases the underlying listener.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Document>>>;

/// Document store scoped by [`CollectionPath`]
///
/// Implementations own id assignment and delivery order. Writes report
/// [`WriteError`](crate::core::error::WriteError) kinds; subscriptions
/// report [`SubscriptionError`](crate::core::error::SubscriptionError).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its new id
    async fn add(&self, path: &CollectionPath, fields: Fields) -> Result<String>;

    /// Merge fields into an existing document
    async fn update(&self, path: &CollectionPath, id: &str, patch: Fields) -> Result<()>;

    /// Remove a document
    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<()>;

    /// One-shot read of the current snapshot
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>>;

    /// Open a realtime snapshot feed
    fn subscribe(&self, path: &CollectionPath) -> SnapshotStream;
}
