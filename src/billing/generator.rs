//! Recurring payment generator
//!
//! Derives the current month's expected payments from each client's fee and
//! billing frequency and inserts the ones that do not exist yet.
//!
//! De-duplication is the existence check against the payment view: a
//! payment covering `(client_id, year, month name)` means nothing is owed.
//! On top of that, runs within one generator are serialised and every
//! inserted period stays in a pending ledger until the payments feed has
//! caught up with the insert, so reactive triggers that fire before then do
//! not insert twice. Two separate sessions can still race.

use super::calendar::{Locale, month_name};
use crate::core::clock::Clock;
use crate::core::collection::Collection;
use crate::entities::{Client, Payment};
use crate::repository::Repository;
use crate::sync::ViewState;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Period {
    client_id: String,
    year: i32,
    month: String,
}

impl Period {
    fn of(payment: &Payment) -> Self {
        Self {
            client_id: payment.client_id.clone(),
            year: payment.year,
            month: payment.month.clone(),
        }
    }

    fn is_covered_by(&self, payments: &[Payment]) -> bool {
        payments
            .iter()
            .any(|p| p.covers(&self.client_id, self.year, &self.month))
    }
}

/// Payments revision seen right after an insert returned
///
/// The snapshot applied next may have been read before the insert; the one
/// after it was read later and reflects the insert, or its deletion.
#[derive(Debug, Clone, Copy)]
struct InsertedAt(u64);

impl InsertedAt {
    fn is_settled(self, current: u64) -> bool {
        current >= self.0 + 2
    }
}

pub struct RecurringPaymentGenerator {
    locale: Locale,
    running: tokio::sync::Mutex<()>,
    pending: Mutex<HashMap<Period, InsertedAt>>,
}

impl RecurringPaymentGenerator {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            running: tokio::sync::Mutex::new(()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Payments owed for the month containing `today` and not yet present
    ///
    /// Pure: looks only at its arguments.
    pub fn plan(&self, clients: &[Client], payments: &[Payment], today: NaiveDate) -> Vec<Payment> {
        let month0 = today.month0();
        let year = today.year();
        let (Some(month), Some(due_date)) = (month_name(month0, self.locale), today.with_day(1))
        else {
            return Vec::new();
        };

        clients
            .iter()
            .filter(|client| !client.id.is_empty())
            .filter_map(|client| {
                let (fee, frequency) = client.billing_plan()?;
                if !frequency.triggers_in(month0) {
                    return None;
                }
                if payments.iter().any(|p| p.covers(&client.id, year, month)) {
                    return None;
                }
                Some(Payment::pending(&client.id, fee, due_date, month, year))
            })
            .collect()
    }

    /// Insert the payments owed for `today`, returning their ids
    ///
    /// Reads clients and payments from the view at call time. Failed inserts
    /// are logged and skipped; the next run retries them.
    pub async fn run(
        &self,
        payments_repo: &Repository<Payment>,
        view: &watch::Receiver<ViewState>,
        today: NaiveDate,
    ) -> Vec<String> {
        let _running = self.running.lock().await;

        let (clients, payments, revision) = {
            let state = view.borrow();
            (
                state.clients.clone(),
                state.payments.clone(),
                state.revision(Collection::Payments),
            )
        };
        let current_month = month_name(today.month0(), self.locale);

        let owed: Vec<Payment> = {
            let Ok(mut pending) = self.pending.lock() else {
                tracing::error!("Payment ledger poisoned, skipping generator run");
                return Vec::new();
            };
            pending.retain(|period, inserted| {
                period.year == today.year()
                    && Some(period.month.as_str()) == current_month
                    && !inserted.is_settled(revision)
                    && !period.is_covered_by(&payments)
            });
            self.plan(&clients, &payments, today)
                .into_iter()
                .filter(|payment| !pending.contains_key(&Period::of(payment)))
                .collect()
        };

        let mut created = Vec::with_capacity(owed.len());
        for payment in owed {
            match payments_repo.add(&payment).await {
                Ok(id) => {
                    tracing::info!(
                        client_id = %payment.client_id,
                        month = %payment.month,
                        year = payment.year,
                        amount = payment.amount,
                        "Generated recurring payment"
                    );
                    let inserted = InsertedAt(view.borrow().revision(Collection::Payments));
                    if let Ok(mut pending) = self.pending.lock() {
                        pending.insert(Period::of(&payment), inserted);
                    }
                    created.push(id);
                }
                Err(e) => {
                    tracing::error!(
                        client_id = %payment.client_id,
                        error = %e,
                        "Failed to generate recurring payment"
                    );
                }
            }
        }

        created
    }

    /// Run whenever the clients or payments snapshot changes
    ///
    /// Waits until both collections have loaded without error. The task
    /// ends when the view's sender is dropped; abort it to stop earlier.
    pub fn spawn_reactive(
        self: Arc<Self>,
        payments_repo: Repository<Payment>,
        mut view: watch::Receiver<ViewState>,
        clock: Arc<dyn Clock>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_seen = None;
            loop {
                let trigger = {
                    let state = view.borrow_and_update();
                    readiness(&state)
                };
                if trigger.is_some() && trigger != last_seen {
                    last_seen = trigger;
                    self.run(&payments_repo, &view, clock.today()).await;
                }
                if view.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Recurring payment generator stopped");
        })
    }
}

/// Revisions of the two inputs, once both are usable
fn readiness(state: &ViewState) -> Option<(u64, u64)> {
    let usable = |collection| {
        state.has_loaded(collection) && state.load_error(collection).is_none()
    };
    if usable(Collection::Clients) && usable(Collection::Payments) {
        Some((
            state.revision(Collection::Clients),
            state.revision(Collection::Payments),
        ))
    } else {
        None
    }
}
