//! # Client CRM
//!
//! Core of a single-user CRM dashboard for a small professional practice:
//! clients, recurring payments, tax filings, tasks and notifications kept
//! in a realtime document backend.
//!
//! ## Features
//!
//! - **Injected Backends**: `DocumentStore` and `AuthProvider` traits, with in-memory implementations
//! - **Typed Repositories**: one repository per entity kind, validated before writing
//! - **Realtime Sync**: full-snapshot subscriptions pumped into a `watch` channel of view state
//! - **Recurring Billing**: monthly, quarterly and annual fees turned into pending payments once per period
//! - **Sections**: pure row builders, forms and aggregates for every dashboard section
//! - **Scoped Teardown**: signing out releases every subscription the workspace opened
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crm::prelude::*;
//!
//! let config = CrmConfig::from_env()?;
//! let store = Arc::new(InMemoryDocumentStore::with_event_capacity(config.settings.event_capacity));
//! let auth = Arc::new(InMemoryAuthProvider::new());
//! let app = CrmApp::new(config, auth.clone(), store);
//!
//! let session = auth.sign_up("ana@example.com", "secret1").await?;
//! let workspace = app.mount(session).await;
//!
//! workspace
//!     .clients()
//!     .add(&Client::new("Acme", "B12345678").with_billing(50.0, BillingFrequency::Monthly))
//!     .await;
//!
//! // The generator inserts this month's payment; the feed brings it back
//! let view = workspace.wait_for(|v| !v.payments.is_empty()).await;
//! println!("{:?}", DashboardStats::compute(&view));
//!
//! workspace.close().await;
//! ```

pub mod app;
pub mod billing;
pub mod config;
pub mod core;
pub mod entities;
pub mod repository;
pub mod sections;
pub mod storage;
pub mod sync;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AuthError, AuthProvider, Clock, Collection, CollectionPath, ConfigError, CrmError,
        Document, DocumentStore, FederatedProvider, FixedClock, Record, Result, Session,
        SignInMethod, SubscriptionError, SystemClock, ValidationError, WriteError, WriteOperation,
    };

    // === Entities ===
    pub use crate::entities::{
        BillingFrequency, Client, ClientPatch, Notification, NotificationPatch,
        NotificationStatus, Payment, PaymentPatch, PaymentStatus, TAX_FORM_CODES, Task,
        TaskPatch, TaskStatus, TaxFiling, TaxFilingPatch, TaxStatus,
    };

    // === Data flow ===
    pub use crate::billing::{Locale, RecurringPaymentGenerator};
    pub use crate::repository::{Repositories, Repository};
    pub use crate::sync::{RealtimeSync, SubscriptionHandle, ViewState};

    // === Sections ===
    pub use crate::sections::{DashboardStats, Section, SectionActions};

    // === Wiring ===
    pub use crate::app::{CrmApp, Workspace};
    pub use crate::config::{AppSettings, BackendConfig, CrmConfig};
    pub use crate::storage::{InMemoryAuthProvider, InMemoryDocumentStore};

    // === External re-exports ===
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use std::sync::Arc;
}
