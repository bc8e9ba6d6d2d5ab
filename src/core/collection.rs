//! Collection names and per-user document paths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five per-user record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Clients,
    Payments,
    Taxes,
    Tasks,
    Notifications,
}

impl Collection {
    /// Every collection, in the order subscriptions are opened
    pub const ALL: [Collection; 5] = [
        Collection::Clients,
        Collection::Payments,
        Collection::Taxes,
        Collection::Tasks,
        Collection::Notifications,
    ];

    /// Backend collection name
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Payments => "payments",
            Collection::Taxes => "taxes",
            Collection::Tasks => "tasks",
            Collection::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown collection: {}", s))
    }
}

/// A user's private partition of one collection
///
/// Rendered as `/artifacts/{app_id}/users/{user_id}/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    pub app_id: String,
    pub user_id: String,
    pub collection: Collection,
}

impl CollectionPath {
    pub fn new(
        app_id: impl Into<String>,
        user_id: impl Into<String>,
        collection: Collection,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            user_id: user_id.into(),
            collection,
        }
    }

    /// Same user and app, different collection
    pub fn sibling(&self, collection: Collection) -> Self {
        Self {
            collection,
            ..self.clone()
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/artifacts/{}/users/{}/{}",
            self.app_id, self.user_id, self.collection
        )
    }
}
