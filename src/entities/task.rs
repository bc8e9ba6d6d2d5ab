//! Task records

use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::core::validation::{RecordValidation, validators};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    /// Pending and in-progress tasks count as open
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "Pending"),
            TaskStatus::InProgress => write!(f, "In progress"),
            TaskStatus::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn new(
        client_id: impl Into<String>,
        description: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: String::new(),
            client_id: client_id.into(),
            description: description.into(),
            due_date,
            status: TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl Record for Task {
    type Patch = TaskPatch;

    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> Option<&str> {
        Some(&self.client_id)
    }

    fn validation() -> RecordValidation {
        RecordValidation::new()
            .rule("clientId", validators::required())
            .rule("description", validators::required())
            .rule("dueDate", validators::date_format("%Y-%m-%d"))
    }
}
