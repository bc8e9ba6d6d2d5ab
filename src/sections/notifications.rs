//! Notifications section

use super::client_label;
use crate::entities::{NotificationPatch, NotificationStatus};
use crate::sync::ViewState;

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRow {
    pub id: String,
    /// "General" without a client, "N/A" when the client is gone
    pub client_name: String,
    pub title: String,
    pub description: String,
    pub status: NotificationStatus,
}

pub fn rows(view: &ViewState, status: Option<NotificationStatus>) -> Vec<NotificationRow> {
    view.notifications
        .iter()
        .filter(|note| status.is_none_or(|s| note.status == s))
        .map(|note| NotificationRow {
            id: note.id.clone(),
            client_name: client_label(
                view,
                note.client_id.as_deref().filter(|id| !id.trim().is_empty()),
            ),
            title: note.title.clone(),
            description: note.description.clone(),
            status: note.status,
        })
        .collect()
}

/// Notifications not yet resolved
pub fn unresolved_count(view: &ViewState) -> usize {
    view.notifications
        .iter()
        .filter(|note| note.status != NotificationStatus::Resolved)
        .count()
}

pub fn set_status(status: NotificationStatus) -> NotificationPatch {
    NotificationPatch {
        status: Some(status),
        ..Default::default()
    }
}
