//! Payments section

use super::client_label;
use crate::billing::{Locale, month_name};
use crate::core::error::{Result, ValidationError};
use crate::core::record::Record;
use crate::entities::{Payment, PaymentPatch, PaymentStatus};
use crate::sync::ViewState;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub id: String,
    pub client_id: String,
    /// "N/A" when the client no longer exists
    pub client_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    /// e.g. "March 2026"
    pub period: String,
}

/// Which payments to list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub client_id: Option<String>,
}

impl PaymentFilter {
    fn matches(&self, payment: &Payment) -> bool {
        self.status.is_none_or(|status| payment.status == status)
            && self
                .client_id
                .as_deref()
                .is_none_or(|id| payment.client_id == id)
    }
}

pub fn rows(view: &ViewState, filter: &PaymentFilter) -> Vec<PaymentRow> {
    view.payments
        .iter()
        .filter(|payment| filter.matches(payment))
        .map(|payment| PaymentRow {
            id: payment.id.clone(),
            client_id: payment.client_id.clone(),
            client_name: client_label(view, Some(&payment.client_id)),
            amount: payment.amount,
            due_date: payment.due_date,
            status: payment.status,
            period: format!("{} {}", payment.month, payment.year),
        })
        .collect()
}

/// Patch flipping a payment between pending and paid
pub fn toggle_status(current: PaymentStatus) -> PaymentPatch {
    PaymentPatch::status(match current {
        PaymentStatus::Pending => PaymentStatus::Paid,
        PaymentStatus::Paid => PaymentStatus::Pending,
    })
}

/// Manually entered payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    pub client_id: String,
    pub amount: String,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

impl PaymentForm {
    /// Validated payment; the billing period is the due date's month
    pub fn to_payment(&self, locale: Locale) -> Result<Payment> {
        let raw = self.amount.trim();
        let amount = raw
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| ValidationError::field("amount", format!("'{}' is not a number", raw)))?;
        let month = month_name(self.due_date.month0(), locale)
            .ok_or_else(|| ValidationError::field("dueDate", "month out of range"))?;

        let mut payment = Payment::pending(
            self.client_id.trim(),
            amount,
            self.due_date,
            month,
            self.due_date.year(),
        );
        payment.status = self.status;

        payment.to_fields()?;
        Ok(payment)
    }
}
