//! CRUD callbacks bound to one collection

use crate::core::error::CrmError;
use crate::core::record::Record;
use crate::repository::Repository;
use crate::sync::RealtimeSync;
use std::sync::Arc;

/// Add/update/delete for one section
///
/// Failures never reach the caller as errors: they are logged and the
/// user message is recorded as the collection's write error in the view.
/// Nothing is applied optimistically, the next snapshot shows the result.
pub struct SectionActions<T: Record> {
    repo: Repository<T>,
    sync: Arc<RealtimeSync>,
}

impl<T: Record> Clone for SectionActions<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            sync: self.sync.clone(),
        }
    }
}

impl<T: Record> SectionActions<T> {
    pub fn new(repo: Repository<T>, sync: Arc<RealtimeSync>) -> Self {
        Self { repo, sync }
    }

    pub fn repository(&self) -> &Repository<T> {
        &self.repo
    }

    /// Returns the new id, or `None` when the write failed
    pub async fn add(&self, record: &T) -> Option<String> {
        match self.repo.add(record).await {
            Ok(id) => {
                self.sync.clear_write_error(T::COLLECTION);
                Some(id)
            }
            Err(e) => {
                self.report("add", e);
                None
            }
        }
    }

    /// Returns whether the update went through
    pub async fn update(&self, id: &str, patch: &T::Patch) -> bool {
        match self.repo.update(id, patch).await {
            Ok(()) => {
                self.sync.clear_write_error(T::COLLECTION);
                true
            }
            Err(e) => {
                self.report("update", e);
                false
            }
        }
    }

    /// Returns whether the delete went through
    pub async fn delete(&self, id: &str) -> bool {
        match self.repo.delete(id).await {
            Ok(()) => {
                self.sync.clear_write_error(T::COLLECTION);
                true
            }
            Err(e) => {
                self.report("delete", e);
                false
            }
        }
    }

    fn report(&self, operation: &str, err: CrmError) {
        tracing::error!(
            collection = %T::COLLECTION,
            operation = operation,
            error_code = err.error_code(),
            error = %err,
            "Write failed"
        );
        self.sync
            .record_write_error(T::COLLECTION, err.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::Collection;
    use crate::entities::{Task, TaskPatch, TaskStatus};
    use crate::repository::Repositories;
    use crate::storage::InMemoryDocumentStore;
    use chrono::NaiveDate;

    fn setup() -> (InMemoryDocumentStore, Repositories, Arc<RealtimeSync>) {
        let store = InMemoryDocumentStore::new();
        let repos = Repositories::new(Arc::new(store.clone()), "app", "u1");
        let sync = Arc::new(RealtimeSync::open(&repos));
        (store, repos, sync)
    }

    fn task() -> Task {
        Task::new("c1", "Call", NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
    }

    #[tokio::test]
    async fn test_failed_write_is_recorded_not_raised() {
        let (store, repos, sync) = setup();
        let actions = SectionActions::new(repos.tasks.clone(), sync.clone());

        store.set_unavailable(repos.tasks.path(), true);
        assert_eq!(actions.add(&task()).await, None);
        assert_eq!(
            sync.snapshot().write_error(Collection::Tasks),
            Some("Error adding data.")
        );

        // Next successful write clears it
        store.set_unavailable(repos.tasks.path(), false);
        assert!(actions.add(&task()).await.is_some());
        assert_eq!(sync.snapshot().write_error(Collection::Tasks), None);

        sync.close().await;
    }

    #[tokio::test]
    async fn test_update_missing_record_reports_not_found() {
        let (_, repos, sync) = setup();
        let actions = SectionActions::new(repos.tasks.clone(), sync.clone());

        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        assert!(!actions.update("missing", &patch).await);
        assert_eq!(
            sync.snapshot().write_error(Collection::Tasks),
            Some("The record no longer exists.")
        );

        sync.close().await;
    }

    #[tokio::test]
    async fn test_write_errors_are_collection_scoped() {
        let (_, repos, sync) = setup();
        let actions = SectionActions::new(repos.tasks.clone(), sync.clone());

        assert!(!actions.delete("missing").await);
        let view = sync.snapshot();
        assert!(view.write_error(Collection::Tasks).is_some());
        assert!(view.write_error(Collection::Clients).is_none());

        sync.close().await;
    }
}
