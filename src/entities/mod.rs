//! Domain records, one per collection

pub mod client;
pub mod notification;
pub mod payment;
pub mod task;
pub mod tax;

pub use client::{BillingFrequency, Client, ClientPatch, TAX_FORM_CODES};
pub use notification::{Notification, NotificationPatch, NotificationStatus};
pub use payment::{Payment, PaymentPatch, PaymentStatus};
pub use task::{Task, TaskPatch, TaskStatus};
pub use tax::{TaxFiling, TaxFilingPatch, TaxStatus};
