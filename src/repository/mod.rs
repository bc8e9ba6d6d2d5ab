//! Typed CRUD gateway
//!
//! One [`Repository`] per entity kind, each bound to the signed-in user's
//! partition of its collection. Repositories never touch the view state:
//! the realtime feed is the source of truth for what gets rendered.

use crate::core::collection::{Collection, CollectionPath};
use crate::core::document::Document;
use crate::core::error::Result;
use crate::core::record::Record;
use crate::core::service::DocumentStore;
use crate::entities::{Client, Notification, Payment, Task, TaxFiling};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use std::marker::PhantomData;
use std::sync::Arc;

/// CRUD operations for one record type in one user's partition
pub struct Repository<T: Record> {
    store: Arc<dyn DocumentStore>,
    path: CollectionPath,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        app_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            path: CollectionPath::new(app_id, user_id, T::COLLECTION),
            _record: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Validate and insert a record, returning the backend id
    ///
    /// The record's own `id` is ignored.
    pub async fn add(&self, record: &T) -> Result<String> {
        let fields = record.to_fields()?;
        let id = self.store.add(&self.path, fields).await?;
        tracing::debug!(collection = %T::COLLECTION, id = %id, "Record added");
        Ok(id)
    }

    /// Validate and merge a partial update
    pub async fn update(&self, id: &str, patch: &T::Patch) -> Result<()> {
        let fields = T::patch_fields(patch)?;
        self.store.update(&self.path, id, fields).await?;
        tracing::debug!(collection = %T::COLLECTION, id = %id, "Record updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&self.path, id).await?;
        tracing::debug!(collection = %T::COLLECTION, id = %id, "Record deleted");
        Ok(())
    }

    /// One-shot read of the current records
    pub async fn list(&self) -> Result<Vec<T>> {
        let documents = self.store.list(&self.path).await?;
        Ok(decode_all(T::COLLECTION, &documents))
    }

    /// Realtime feed of typed snapshots
    ///
    /// Documents that do not decode are logged and left out of the
    /// snapshot. Dropping the stream releases the backend listener.
    pub fn subscribe(&self) -> BoxStream<'static, Result<Vec<T>>> {
        self.store
            .subscribe(&self.path)
            .map_ok(|documents| decode_all(T::COLLECTION, &documents))
            .boxed()
    }
}

fn decode_all<T: Record>(collection: Collection, documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| match document.decode::<T>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    id = %document.id,
                    error = %e,
                    "Skipping malformed document"
                );
                None
            }
        })
        .collect()
}

/// Exactly one repository per entity kind, all scoped to one user
#[derive(Clone)]
pub struct Repositories {
    pub user_id: String,
    pub clients: Repository<Client>,
    pub payments: Repository<Payment>,
    pub taxes: Repository<TaxFiling>,
    pub tasks: Repository<Task>,
    pub notifications: Repository<Notification>,
}

impl Repositories {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: &str, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            clients: Repository::new(store.clone(), app_id, user_id),
            payments: Repository::new(store.clone(), app_id, user_id),
            taxes: Repository::new(store.clone(), app_id, user_id),
            tasks: Repository::new(store.clone(), app_id, user_id),
            notifications: Repository::new(store, app_id, user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BillingFrequency, ClientPatch, PaymentPatch, PaymentStatus};
    use crate::storage::InMemoryDocumentStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn repos() -> (InMemoryDocumentStore, Repositories) {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "crm-test", "user-1");
        (store, repos)
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_list_decodes() {
        let (_, repos) = repos();
        let client = Client::new("Acme", "B123").with_billing(50.0, BillingFrequency::Monthly);

        let id = repos.clients.add(&client).await.unwrap();
        assert!(!id.is_empty());

        let listed = repos.clients.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].name, "Acme");
        assert_eq!(listed[0].fee, Some(50.0));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_record() {
        let (store, repos) = repos();
        let err = repos.clients.add(&Client::new("  ", "B123")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(store.list(repos.clients.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let (_, repos) = repos();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let id = repos
            .payments
            .add(&Payment::pending("c1", 50.0, date, "March", 2026))
            .await
            .unwrap();

        repos
            .payments
            .update(&id, &PaymentPatch::status(PaymentStatus::Paid))
            .await
            .unwrap();

        let payment = &repos.payments.list().await.unwrap()[0];
        assert!(payment.is_paid());
        assert_eq!(payment.amount, 50.0);
    }

    #[tokio::test]
    async fn test_patch_can_clear_optional_field() {
        let (_, repos) = repos();
        let id = repos
            .clients
            .add(&Client::new("Acme", "B123").with_email("a@acme.test"))
            .await
            .unwrap();

        let patch = ClientPatch {
            email: Some(None),
            ..Default::default()
        };
        repos.clients.update(&id, &patch).await.unwrap();

        assert_eq!(repos.clients.list().await.unwrap()[0].email, None);
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let (store, repos) = repos();
        store
            .add(
                repos.payments.path(),
                json!({"amount": "fifty"}).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        assert!(repos.payments.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_yields_typed_snapshots() {
        let (_, repos) = repos();
        let mut feed = repos.tasks.subscribe();
        assert!(feed.next().await.unwrap().unwrap().is_empty());

        let due = NaiveDate::from_ymd_opt(2026, 4, 30).unwrap();
        repos
            .tasks
            .add(&Task::new("c1", "File 303", due))
            .await
            .unwrap();

        let snapshot = feed.next().await.unwrap().unwrap();
        assert_eq!(snapshot[0].description, "File 303");
        assert!(!snapshot[0].id.is_empty());
    }

    #[test]
    fn test_repositories_share_user_partition() {
        let (_, repos) = repos();
        assert_eq!(repos.clients.path().user_id, "user-1");
        assert_eq!(repos.notifications.path().collection, Collection::Notifications);
        assert_eq!(
            repos.payments.path().to_string(),
            "/artifacts/crm-test/users/user-1/payments"
        );
    }
}
