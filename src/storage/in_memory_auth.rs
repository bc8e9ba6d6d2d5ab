//! In-memory AuthProvider for testing and development
//!
//! Accounts live in process memory with plaintext passwords. Do not point
//! anything real at it.

use crate::core::auth::{AuthProvider, FederatedProvider, Session, SignInMethod};
use crate::core::error::{AuthError, CrmError, Result};
use crate::core::validation::validators::is_valid_email;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tokio::sync::watch;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    /// `None` for accounts created through a federated provider
    password: Option<String>,
}

/// In-memory authentication backend
///
/// The federated flow has no popup: a test or demo stages the account the
/// provider will return with [`stage_federated_account`](Self::stage_federated_account).
/// Without a staged account the flow behaves like a cancelled popup.
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    staged_federated: Mutex<Option<String>>,
    session: watch::Sender<Option<Session>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            staged_federated: Mutex::new(None),
            session,
        }
    }

    /// Make the next federated sign-in return this email
    pub fn stage_federated_account(&self, email: impl Into<String>) {
        if let Ok(mut staged) = self.staged_federated.lock() {
            *staged = Some(email.into());
        }
    }

    fn invalid(message: impl Into<String>) -> CrmError {
        AuthError::InvalidCredentials {
            message: message.into(),
        }
        .into()
    }

    fn lock_error(e: impl std::fmt::Display) -> CrmError {
        CrmError::Internal(format!("Failed to acquire accounts lock: {}", e))
    }

    fn start_session(&self, session: Session) -> Session {
        tracing::info!(user_id = %session.user_id, email = %session.email, "Session started");
        self.session.send_replace(Some(session.clone()));
        session
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize(email);
        let account = {
            let accounts = self.accounts.read().map_err(Self::lock_error)?;
            accounts.get(&email).cloned()
        };

        match account {
            Some(Account {
                user_id,
                password: Some(stored),
            }) if stored == password => Ok(self.start_session(Session {
                user_id,
                email,
                method: SignInMethod::Password,
            })),
            _ => {
                tracing::debug!(email = %email, "Sign-in rejected");
                Err(Self::invalid("wrong email or password"))
            }
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize(email);
        if !is_valid_email(&email) {
            return Err(Self::invalid(format!("'{}' is not a valid email", email)));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Self::invalid(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user_id = {
            let mut accounts = self.accounts.write().map_err(Self::lock_error)?;
            if accounts.contains_key(&email) {
                return Err(Self::invalid("email already in use"));
            }
            let user_id = Uuid::new_v4().simple().to_string();
            accounts.insert(
                email.clone(),
                Account {
                    user_id: user_id.clone(),
                    password: Some(password.to_string()),
                },
            );
            user_id
        };

        Ok(self.start_session(Session {
            user_id,
            email,
            method: SignInMethod::Password,
        }))
    }

    async fn sign_in_with_federated(&self, provider: FederatedProvider) -> Result<Session> {
        let staged = self
            .staged_federated
            .lock()
            .map_err(Self::lock_error)?
            .take();
        let Some(email) = staged else {
            return Err(AuthError::FederatedSignInFailed {
                provider: provider.to_string(),
                message: "popup closed by user".to_string(),
            }
            .into());
        };

        let email = normalize(&email);
        let user_id = {
            let mut accounts = self.accounts.write().map_err(Self::lock_error)?;
            accounts
                .entry(email.clone())
                .or_insert_with(|| Account {
                    user_id: Uuid::new_v4().simple().to_string(),
                    password: None,
                })
                .user_id
                .clone()
        };

        Ok(self.start_session(Session {
            user_id,
            email,
            method: SignInMethod::Federated(provider),
        }))
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(previous) = self.session.send_replace(None) {
            tracing::info!(user_id = %previous.user_id, "Session ended");
        }
        Ok(())
    }

    fn watch_session(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
