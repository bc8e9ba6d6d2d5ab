//! Core module containing fundamental traits and types

pub mod auth;
pub mod clock;
pub mod collection;
pub mod document;
pub mod error;
pub mod events;
pub mod record;
pub mod service;
pub mod validation;

pub use auth::{AuthProvider, FederatedProvider, Session, SignInMethod};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{Collection, CollectionPath};
pub use document::{Document, Fields};
pub use error::{
    AuthError, ConfigError, CrmError, Result, SubscriptionError, ValidationError, WriteError,
    WriteOperation,
};
pub use events::{EventBus, EventEnvelope, StoreEvent};
pub use record::Record;
pub use service::{DocumentStore, SnapshotStream};
pub use validation::RecordValidation;
