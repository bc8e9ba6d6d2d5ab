//! Calendar source used by the payment generator

use chrono::{Datelike, Local, NaiveDate};
use std::sync::RwLock;

/// Provides the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A settable date, for simulations and tests
#[derive(Debug)]
pub struct FixedClock {
    date: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: RwLock::new(date),
        }
    }

    /// First day of the given month (1-based)
    pub fn at(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::new)
    }

    pub fn set(&self, date: NaiveDate) {
        if let Ok(mut current) = self.date.write() {
            *current = date;
        }
    }

    /// Move to the first day of the following month
    pub fn advance_month(&self) {
        let today = self.today();
        let (year, month) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        if let Some(next) = NaiveDate::from_ymd_opt(year, month, 1) {
            self.set(next);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.date.read() {
            Ok(date) => *date,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
