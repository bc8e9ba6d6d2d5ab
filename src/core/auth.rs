//! Authentication gate
//!
//! An [`AuthProvider`] wraps sign-in, sign-up and sign-out against the
//! authentication backend and exposes the current session as a watch
//! channel. Components observe that channel to mount and unmount the
//! per-user workspace.

use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// External identity providers for the federated flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    Google,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FederatedProvider::Google => write!(f, "google"),
        }
    }
}

/// How a session was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInMethod {
    Password,
    Federated(FederatedProvider),
}

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique user identifier, the scoping key for every collection
    pub user_id: String,
    pub email: String,
    pub method: SignInMethod,
}

/// Authentication backend contract
///
/// Email/password failures are reported as
/// [`AuthError::InvalidCredentials`](crate::core::error::AuthError::InvalidCredentials)
/// and federated failures as
/// [`AuthError::FederatedSignInFailed`](crate::core::error::AuthError::FederatedSignInFailed).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with an existing account
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Create an account and sign in
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Sign in through an external identity provider
    async fn sign_in_with_federated(&self, provider: FederatedProvider) -> Result<Session>;

    /// End the current session (no-op when signed out)
    async fn sign_out(&self) -> Result<()>;

    /// Subscribe to session changes; the current value is available at once
    fn watch_session(&self) -> watch::Receiver<Option<Session>>;

    /// Current session, if any
    fn current_session(&self) -> Option<Session> {
        self.watch_session().borrow().clone()
    }
}
