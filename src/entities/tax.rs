//! Tax filing records (collection `taxes`)

use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::core::validation::{RecordValidation, validators};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxStatus {
    #[default]
    Pending,
    Filed,
    Reviewed,
}

impl fmt::Display for TaxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxStatus::Pending => write!(f, "Pending"),
            TaxStatus::Filed => write!(f, "Filed"),
            TaxStatus::Reviewed => write!(f, "Reviewed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxFiling {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    /// Display label, usually the form code and period
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: TaxStatus,
    /// Link to the filed document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TaxFiling {
    pub fn new(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            client_id: client_id.into(),
            name: name.into(),
            status: TaxStatus::Pending,
            link: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxFilingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaxStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Option<String>>,
}

impl Record for TaxFiling {
    type Patch = TaxFilingPatch;

    const COLLECTION: Collection = Collection::Taxes;

    fn id(&self) -> &str {
        &self.id
    }

    fn client_id(&self) -> Option<&str> {
        Some(&self.client_id)
    }

    fn validation() -> RecordValidation {
        RecordValidation::new()
            .rule("clientId", validators::required())
            .rule("name", validators::required())
            .rule("link", validators::url())
    }
}
