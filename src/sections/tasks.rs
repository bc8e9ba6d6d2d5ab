//! Tasks section

use super::client_label;
use crate::entities::{TaskPatch, TaskStatus};
use crate::sync::ViewState;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: String,
    pub client_name: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    /// Still open and past its due date
    pub overdue: bool,
}

pub fn rows(view: &ViewState, today: NaiveDate, open_only: bool) -> Vec<TaskRow> {
    view.tasks
        .iter()
        .filter(|task| !open_only || task.status.is_open())
        .map(|task| TaskRow {
            id: task.id.clone(),
            client_name: client_label(view, Some(&task.client_id)),
            description: task.description.clone(),
            due_date: task.due_date,
            status: task.status,
            overdue: task.status.is_open() && task.due_date < today,
        })
        .collect()
}

pub fn set_status(status: TaskStatus) -> TaskPatch {
    TaskPatch {
        status: Some(status),
        ..Default::default()
    }
}
