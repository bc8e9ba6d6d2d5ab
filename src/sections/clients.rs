//! Clients section: list rows, edit form and print sheet

use crate::core::error::{Result, ValidationError};
use crate::core::record::Record;
use crate::entities::{BillingFrequency, Client, ClientPatch, TAX_FORM_CODES};
use crate::sync::ViewState;
use indexmap::IndexMap;
use std::fmt::Write as _;

/// One line of the clients table
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// e.g. "50.00 / Monthly"
    pub billing: Option<String>,
    pub tax_forms: Vec<String>,
}

impl ClientRow {
    fn from_client(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            tax_id: client.tax_id.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            billing: billing_label(client),
            tax_forms: client
                .subscribed_tax_forms()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

fn billing_label(client: &Client) -> Option<String> {
    client
        .billing_plan()
        .map(|(fee, frequency)| format!("{:.2} / {}", fee, frequency))
}

/// Rows in name order, filtered by a case-insensitive search on name or tax id
pub fn rows(view: &ViewState, search: &str) -> Vec<ClientRow> {
    let needle = search.trim().to_lowercase();
    view.clients
        .iter()
        .filter(|client| {
            needle.is_empty()
                || client.name.to_lowercase().contains(&needle)
                || client.tax_id.to_lowercase().contains(&needle)
        })
        .map(ClientRow::from_client)
        .collect()
}

/// Edit state of the client modal: every input as typed
#[derive(Debug, Clone, PartialEq)]
pub struct ClientForm {
    pub name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub bank_account: String,
    pub drive_folder_id: String,
    pub fee: String,
    /// Empty for no recurring billing
    pub billing_frequency: String,
    pub tax_forms: IndexMap<String, bool>,
}

impl Default for ClientForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            tax_id: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            bank_account: String::new(),
            drive_folder_id: String::new(),
            fee: String::new(),
            billing_frequency: String::new(),
            tax_forms: TAX_FORM_CODES
                .iter()
                .map(|code| ((*code).to_string(), false))
                .collect(),
        }
    }
}

impl ClientForm {
    /// Pre-filled form for editing an existing client
    ///
    /// Codes missing from older records are added unchecked.
    pub fn from_client(client: &Client) -> Self {
        let mut tax_forms = ClientForm::default().tax_forms;
        for (code, subscribed) in &client.tax_forms {
            tax_forms.insert(code.clone(), *subscribed);
        }

        Self {
            name: client.name.clone(),
            tax_id: client.tax_id.clone(),
            email: client.email.clone().unwrap_or_default(),
            phone: client.phone.clone().unwrap_or_default(),
            address: client.address.clone().unwrap_or_default(),
            bank_account: client.bank_account.clone().unwrap_or_default(),
            drive_folder_id: client.drive_folder_id.clone().unwrap_or_default(),
            fee: client.fee.map(|fee| fee.to_string()).unwrap_or_default(),
            billing_frequency: client
                .billing_frequency
                .map(|f| f.to_string())
                .unwrap_or_default(),
            tax_forms,
        }
    }

    pub fn toggle_tax_form(&mut self, code: &str) {
        let entry = self.tax_forms.entry(code.to_string()).or_insert(false);
        *entry = !*entry;
    }

    /// Validated client for an `add`
    pub fn to_client(&self) -> Result<Client> {
        let mut client = Client::new(self.name.trim(), self.tax_id.trim());
        client.email = optional(&self.email);
        client.phone = optional(&self.phone);
        client.address = optional(&self.address);
        client.bank_account = optional(&self.bank_account);
        client.drive_folder_id = optional(&self.drive_folder_id);
        client.fee = self.parsed_fee()?;
        client.billing_frequency = self.parsed_frequency()?;
        client.tax_forms = self.tax_forms.clone();

        client.to_fields()?;
        Ok(client)
    }

    /// Validated patch replacing every editable field
    pub fn to_patch(&self) -> Result<ClientPatch> {
        let client = self.to_client()?;
        Ok(ClientPatch {
            name: Some(client.name),
            tax_id: Some(client.tax_id),
            email: Some(client.email),
            phone: Some(client.phone),
            address: Some(client.address),
            bank_account: Some(client.bank_account),
            drive_folder_id: Some(client.drive_folder_id),
            fee: Some(client.fee),
            billing_frequency: Some(client.billing_frequency),
            tax_forms: Some(client.tax_forms),
        })
    }

    /// Accepts a decimal comma; "inf" and "NaN" are not fees
    fn parsed_fee(&self) -> Result<Option<f64>> {
        let raw = self.fee.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|fee| fee.is_finite())
            .map(Some)
            .ok_or_else(|| ValidationError::field("fee", format!("'{}' is not a number", raw)).into())
    }

    fn parsed_frequency(&self) -> Result<Option<BillingFrequency>> {
        let raw = self.billing_frequency.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<BillingFrequency>()
            .map(Some)
            .map_err(|message: String| ValidationError::field("billingFrequency", message).into())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Plain-text client sheet for printing
pub fn print_view(client: &Client) -> String {
    let dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let forms = client.subscribed_tax_forms();

    let mut sheet = String::new();
    let _ = writeln!(sheet, "CLIENT SHEET");
    let _ = writeln!(sheet, "============");
    let _ = writeln!(sheet, "Name:          {}", client.name);
    let _ = writeln!(sheet, "Tax ID:        {}", client.tax_id);
    let _ = writeln!(sheet, "Email:         {}", dash(&client.email));
    let _ = writeln!(sheet, "Phone:         {}", dash(&client.phone));
    let _ = writeln!(sheet, "Address:       {}", dash(&client.address));
    let _ = writeln!(sheet, "Bank account:  {}", dash(&client.bank_account));
    let _ = writeln!(
        sheet,
        "Billing:       {}",
        billing_label(client).unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        sheet,
        "Tax forms:     {}",
        if forms.is_empty() {
            "-".to_string()
        } else {
            forms.join(", ")
        }
    );
    sheet
}
