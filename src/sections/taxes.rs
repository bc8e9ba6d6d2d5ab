//! Tax filings section

use super::client_label;
use crate::entities::{Client, TaxFiling, TaxFilingPatch, TaxStatus};
use crate::sync::ViewState;

#[derive(Debug, Clone, PartialEq)]
pub struct TaxRow {
    pub id: String,
    pub client_name: String,
    pub name: String,
    pub status: TaxStatus,
    pub link: Option<String>,
}

pub fn rows(view: &ViewState, status: Option<TaxStatus>) -> Vec<TaxRow> {
    view.taxes
        .iter()
        .filter(|filing| status.is_none_or(|s| filing.status == s))
        .map(|filing| TaxRow {
            id: filing.id.clone(),
            client_name: client_label(view, Some(&filing.client_id)),
            name: filing.name.clone(),
            status: filing.status,
            link: filing.link.clone(),
        })
        .collect()
}

/// Pending → Filed → Reviewed; Reviewed stays put
pub fn advance(status: TaxStatus) -> TaxFilingPatch {
    let next = match status {
        TaxStatus::Pending => TaxStatus::Filed,
        TaxStatus::Filed | TaxStatus::Reviewed => TaxStatus::Reviewed,
    };
    TaxFilingPatch {
        status: Some(next),
        ..Default::default()
    }
}

/// One pending filing per tax form the client is subscribed to
///
/// Labels are "{code} {period}", e.g. "303 Q1 2026".
pub fn filings_for(client: &Client, period: &str) -> Vec<TaxFiling> {
    client
        .subscribed_tax_forms()
        .into_iter()
        .map(|code| TaxFiling::new(&client.id, format!("{} {}", code, period.trim())))
        .collect()
}
