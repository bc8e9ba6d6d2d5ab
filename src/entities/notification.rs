//! Notification records

use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::core::validation::{RecordValidation, validators};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NotificationStatus {
    #[default]
    Awaiting,
    Open,
    #[serde(rename = "In progress")]
    InProgress,
    Resolved,
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationStatus::Awaiting => write!(f, "Awaiting"),
            NotificationStatus::Open => write!(f, "Open"),
            NotificationStatus::InProgress => write!(f, "In progress"),
            NotificationStatus::Resolved => write!(f, "Resolved"),
        }
    }
}

/// A notice about a client, or a general one when `client_id` is absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: NotificationStatus,
}

impl Notification {
    pub fn general(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            client_id: None,
            title: title.into(),
            description: description.into(),
            status: NotificationStatus::Awaiting,
        }
    }

    pub fn for_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NotificationStatus>,
}

impl Record for Notification {
    type Patch = NotificationPatch;

    const COLLECTION: Collection = Collection::Notifications;

    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn validation() -> RecordValidation {
        RecordValidation::new()
            .rule("title", validators::required())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_notification_has_no_client() {
        let note = Notification::general("Office closed", "Holiday on Friday");
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("clientId").is_none());
        assert_eq!(json["status"], "Awaiting");
        assert_eq!(note.client_id(), None);
    }

    #[test]
    fn test_title_required() {
        let note = Notification::general("", "body");
        assert!(note.to_fields().is_err());
    }
}
