//! Payment records

use crate::core::collection::Collection;
use crate::core::error::ValidationError;
use crate::core::record::Record;
use crate::core::validation::{RecordValidation, validators};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

/// A payment owed by a client for one billing month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: PaymentStatus,
    /// Billing month name, capitalized in the configured locale
    #[serde(default)]
    pub month: String,
    pub year: i32,
}

impl Payment {
    pub fn pending(
        client_id: impl Into<String>,
        amount: f64,
        due_date: NaiveDate,
        month: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: String::new(),
            client_id: client_id.into(),
            amount,
            due_date,
            status: PaymentStatus::Pending,
            month: month.into(),
            year,
        }
    }

    /// Whether this payment bills the given client for the given period
    pub fn covers(&self, client_id: &str, year: i32, month: &str) -> bool {
        self.client_id == client_id && self.year == year && self.month == month
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

/// Partial update for a [`Payment`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl PaymentPatch {
    pub fn status(status: PaymentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl Record for Payment {
    type Patch = PaymentPatch;

    const COLLECTION: Collection = Collection::Payments;

    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> Option<&str> {
        Some(&self.client_id)
    }

    fn validation() -> RecordValidation {
        RecordValidation::new()
            .rule("clientId", validators::required())
            .rule("amount", validators::required())
            .rule("amount", validators::non_negative())
            .rule("dueDate", validators::date_format("%Y-%m-%d"))
            .rule("month", validators::required())
            .rule("year", validators::int_range(1970, 9999))
    }

    fn check_values(&self) -> Result<(), ValidationError> {
        validators::finite_amount("amount", Some(self.amount))
    }

    fn check_patch(patch: &PaymentPatch) -> Result<(), ValidationError> {
        validators::finite_amount("amount", patch.amount)
    }
}
