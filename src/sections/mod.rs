//! Presentation sections
//!
//! Each section is a set of pure functions over [`ViewState`] plus the
//! [`SectionActions`] bound to its collection. Sections never mutate the
//! view; they issue writes and wait for the next snapshot.

pub mod actions;
pub mod circulars;
pub mod clients;
pub mod dashboard;
pub mod drive;
pub mod navigation;
pub mod notifications;
pub mod payments;
pub mod tasks;
pub mod taxes;

pub use actions::SectionActions;
pub use dashboard::DashboardStats;
pub use navigation::Section;

use crate::sync::ViewState;

/// Shown for references to clients that no longer exist
pub const UNKNOWN_CLIENT: &str = "N/A";

/// Shown for notifications that are not about a client
pub const GENERAL: &str = "General";

/// Display name for an optional client reference
pub fn client_label(view: &ViewState, client_id: Option<&str>) -> String {
    match client_id {
        None => GENERAL.to_string(),
        Some(id) => view.client_name(id).unwrap_or(UNKNOWN_CLIENT).to_string(),
    }
}
