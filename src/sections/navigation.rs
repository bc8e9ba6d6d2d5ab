//! Sidebar sections

use crate::billing::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Dashboard,
    Clients,
    Payments,
    Taxes,
    Tasks,
    Notifications,
    Circulars,
    Drive,
}

impl Section {
    /// Sidebar order
    pub const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Clients,
        Section::Payments,
        Section::Taxes,
        Section::Tasks,
        Section::Notifications,
        Section::Circulars,
        Section::Drive,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Clients => "clients",
            Section::Payments => "payments",
            Section::Taxes => "taxes",
            Section::Tasks => "tasks",
            Section::Notifications => "notifications",
            Section::Circulars => "circulars",
            Section::Drive => "drive",
        }
    }

    /// Sidebar label
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Section::Dashboard) => "Dashboard",
            (Locale::En, Section::Clients) => "Clients",
            (Locale::En, Section::Payments) => "Payment Tracking",
            (Locale::En, Section::Taxes) => "Tax Management",
            (Locale::En, Section::Tasks) => "Tasks",
            (Locale::En, Section::Notifications) => "Notifications",
            (Locale::En, Section::Circulars) => "Send Circulars",
            (Locale::En, Section::Drive) => "Storage (Drive)",
            (Locale::Es, Section::Dashboard) => "Panel Principal",
            (Locale::Es, Section::Clients) => "Clientes",
            (Locale::Es, Section::Payments) => "Control de Pagos",
            (Locale::Es, Section::Taxes) => "Gestión de Impuestos",
            (Locale::Es, Section::Tasks) => "Tareas",
            (Locale::Es, Section::Notifications) => "Notificaciones",
            (Locale::Es, Section::Circulars) => "Envío de Circulares",
            (Locale::Es, Section::Drive) => "Almacén (Drive)",
        }
    }

    /// Page header: the section id, capitalized
    pub fn header_title(&self) -> String {
        let id = self.id().replace('_', " ");
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| format!("Unknown section: {}", s))
    }
}
