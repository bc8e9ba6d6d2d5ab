//! Recurring billing

pub mod calendar;
pub mod generator;

pub use calendar::{Locale, month_name};
pub use generator::RecurringPaymentGenerator;
