//! Circulars: compose a message to clients and simulate sending it
//!
//! Nothing leaves the process. The report lists who would have received
//! the message.

use crate::core::error::{FieldValidationError, Result, ValidationError};
use crate::sync::ViewState;
use indexmap::IndexSet;
use serde::Serialize;

/// A client that can receive circulars
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub client_id: String,
    pub name: String,
    pub email: String,
}

/// Clients with an email address, in name order
pub fn recipients(view: &ViewState) -> Vec<Recipient> {
    view.clients
        .iter()
        .filter_map(|client| {
            let email = client.email.as_deref()?.trim();
            (!email.is_empty()).then(|| Recipient {
                client_id: client.id.clone(),
                name: client.name.clone(),
                email: email.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircularDraft {
    pub subject: String,
    pub body: String,
    selected: IndexSet<String>,
}

impl CircularDraft {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            selected: IndexSet::new(),
        }
    }

    /// Select or unselect a client
    pub fn toggle(&mut self, client_id: &str) {
        if !self.selected.shift_remove(client_id) {
            self.selected.insert(client_id.to_string());
        }
    }

    /// Select every client that has an email
    pub fn select_all(&mut self, view: &ViewState) {
        self.selected
            .extend(recipients(view).into_iter().map(|r| r.client_id));
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.subject.trim().is_empty() {
            errors.push(FieldValidationError {
                field: "subject".to_string(),
                message: "is required".to_string(),
            });
        }
        if self.body.trim().is_empty() {
            errors.push(FieldValidationError {
                field: "body".to_string(),
                message: "is required".to_string(),
            });
        }
        if self.selected.is_empty() {
            errors.push(FieldValidationError {
                field: "recipients".to_string(),
                message: "select at least one client".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}

/// Outcome of a simulated send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularReport {
    pub subject: String,
    pub delivered: Vec<Recipient>,
    /// Selected ids that are gone or have no email
    pub skipped: Vec<String>,
}

/// Resolve the selection against the current clients without sending
pub fn simulate_send(draft: &CircularDraft, view: &ViewState) -> Result<CircularReport> {
    draft.validate()?;

    let available = recipients(view);
    let (delivered, skipped) = draft.selected().fold(
        (Vec::new(), Vec::new()),
        |(mut delivered, mut skipped), id| {
            match available.iter().find(|r| r.client_id == id) {
                Some(recipient) => delivered.push(recipient.clone()),
                None => skipped.push(id.to_string()),
            }
            (delivered, skipped)
        },
    );

    tracing::info!(
        subject = %draft.subject,
        delivered = delivered.len(),
        skipped = skipped.len(),
        "Circular send simulated"
    );

    Ok(CircularReport {
        subject: draft.subject.trim().to_string(),
        delivered,
        skipped,
    })
}
