//! Dashboard aggregates

use crate::sync::ViewState;
use serde::Serialize;

/// The four figures shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub client_count: usize,
    /// Sum of amounts of paid payments
    pub paid_total: f64,
    pub pending_payments: usize,
    /// Tasks pending or in progress
    pub open_tasks: usize,
}

impl DashboardStats {
    pub fn compute(view: &ViewState) -> Self {
        let (paid_total, pending_payments) =
            view.payments
                .iter()
                .fold((0.0, 0), |(total, pending), payment| {
                    if payment.is_paid() {
                        (total + payment.amount, pending)
                    } else {
                        (total, pending + 1)
                    }
                });

        Self {
            client_count: view.clients.len(),
            paid_total,
            pending_payments,
            open_tasks: view.tasks.iter().filter(|t| t.status.is_open()).count(),
        }
    }
}
