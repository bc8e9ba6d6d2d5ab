//! Client records

use crate::core::collection::Collection;
use crate::core::error::ValidationError;
use crate::core::record::Record;
use crate::core::validation::{RecordValidation, validators};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tax-form codes a client can be subscribed to, in display order
pub const TAX_FORM_CODES: [&str; 10] = [
    "303", "130", "111", "115", "390", "190", "180", "347", "349", "100",
];

/// Cadence at which a client's fee produces a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Annual,
}

impl BillingFrequency {
    /// Zero-based months in which this frequency bills
    pub fn trigger_months(&self) -> &'static [u32] {
        match self {
            BillingFrequency::Monthly => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            BillingFrequency::Quarterly => &[0, 3, 6, 9],
            BillingFrequency::Annual => &[0],
        }
    }

    /// Whether the zero-based month is a billing month
    pub fn triggers_in(&self, month0: u32) -> bool {
        self.trigger_months().contains(&month0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingFrequency::Monthly => "Monthly",
            BillingFrequency::Quarterly => "Quarterly",
            BillingFrequency::Annual => "Annual",
        }
    }
}

impl fmt::Display for BillingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Monthly" => Ok(BillingFrequency::Monthly),
            "Quarterly" => Ok(BillingFrequency::Quarterly),
            "Annual" => Ok(BillingFrequency::Annual),
            other => Err(format!("Unknown billing frequency: {}", other)),
        }
    }
}

/// Documents written by older forms store "no frequency" as an empty string
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<BillingFrequency>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// A client of the practice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    /// Folder identifier in the external file-storage product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_folder_id: Option<String>,
    /// Recurring fee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub billing_frequency: Option<BillingFrequency>,
    /// Tax-form code -> subscribed
    #[serde(default)]
    pub tax_forms: IndexMap<String, bool>,
}

impl Client {
    /// New client with every known tax form present and unsubscribed
    pub fn new(name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            tax_id: tax_id.into(),
            email: None,
            phone: None,
            address: None,
            bank_account: None,
            drive_folder_id: None,
            fee: None,
            billing_frequency: None,
            tax_forms: TAX_FORM_CODES
                .iter()
                .map(|code| ((*code).to_string(), false))
                .collect(),
        }
    }

    pub fn with_billing(mut self, fee: f64, frequency: BillingFrequency) -> Self {
        self.fee = Some(fee);
        self.billing_frequency = Some(frequency);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_drive_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.drive_folder_id = Some(folder_id.into());
        self
    }

    /// Fee and frequency, when both are set and the fee is positive
    ///
    /// A frequency without a fee is inert.
    pub fn billing_plan(&self) -> Option<(f64, BillingFrequency)> {
        match (self.fee, self.billing_frequency) {
            (Some(fee), Some(frequency)) if fee > 0.0 => Some((fee, frequency)),
            _ => None,
        }
    }

    /// Codes of the tax forms this client is subscribed to
    pub fn subscribed_tax_forms(&self) -> Vec<&str> {
        self.tax_forms
            .iter()
            .filter(|(_, on)| **on)
            .map(|(code, _)| code.as_str())
            .collect()
    }

    pub fn set_tax_form(&mut self, code: &str, subscribed: bool) {
        self.tax_forms.insert(code.to_string(), subscribed);
    }
}

/// Partial update for a [`Client`]
///
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_folder_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_frequency: Option<Option<BillingFrequency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_forms: Option<IndexMap<String, bool>>,
}

impl Record for Client {
    type Patch = ClientPatch;

    const COLLECTION: Collection = Collection::Clients;

    fn id(&self) -> &str {
        &self.id
    }

    fn validation() -> RecordValidation {
        RecordValidation::new()
            .rule("name", validators::required())
            .rule("taxId", validators::required())
            .rule("email", validators::email())
            .rule("fee", validators::non_negative())
    }

    fn check_values(&self) -> Result<(), ValidationError> {
        validators::finite_amount("fee", self.fee)
    }

    fn check_patch(patch: &ClientPatch) -> Result<(), ValidationError> {
        validators::finite_amount("fee", patch.fee.flatten())
    }
}
