//! Mock identity provider for testing.
//!
//! Holds accounts in memory and gives tests manual control over the
//! session signal, so the initializing state can be held open or resolved
//! on demand.
//!
//! # Example
//!
//! ```ignore
//! use learnsphere::adapters::identity::MockIdentityProvider;
//!
//! let provider = MockIdentityProvider::new()
//!     .with_account("ada@example.com", "Passw0rd!", identity);
//! provider.resolve_initial(None);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::domain::{AuthError, Identity, ProfileUpdate, UserId};
use crate::ports::{IdentityProvider, SessionSignal};

/// Minimum password length accepted by the simulated provider policy.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    identity: Identity,
}

/// In-memory stand-in for the identity toolkit.
pub struct MockIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Identity>>,
    force_error: RwLock<Option<AuthError>>,
    federated_identity: RwLock<Option<Identity>>,
    next_uid: AtomicU64,
    signal: watch::Sender<SessionSignal>,
}

impl MockIdentityProvider {
    /// Creates an empty provider whose session signal starts initializing.
    pub fn new() -> Self {
        let (signal, _) = watch::channel(SessionSignal::Initializing);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            force_error: RwLock::new(None),
            federated_identity: RwLock::new(None),
            next_uid: AtomicU64::new(1),
            signal,
        }
    }

    /// Registers an existing account.
    pub fn with_account(
        self,
        email: impl Into<String>,
        password: impl Into<String>,
        identity: Identity,
    ) -> Self {
        self.accounts.write().unwrap().insert(
            email.into(),
            Account {
                password: password.into(),
                identity,
            },
        );
        self
    }

    /// Sets the identity the federated flow yields. Without one, federated
    /// sign-in reports `PopupClosed` (the user abandoned the flow).
    pub fn with_federated_identity(self, identity: Identity) -> Self {
        *self.federated_identity.write().unwrap() = Some(identity);
        self
    }

    /// Forces all operations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Forces all operations to return the specified error, at runtime.
    pub fn set_error(&self, error: AuthError) {
        *self.force_error.write().unwrap() = Some(error);
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    /// Resolves the startup signal, as the real provider does after
    /// checking for a restorable session.
    pub fn resolve_initial(&self, identity: Option<Identity>) {
        *self.current.write().unwrap() = identity.clone();
        self.signal.send_replace(SessionSignal::Resolved(identity));
    }

    /// Emits an authoritative session change, e.g. a provider-side expiry.
    pub fn emit(&self, identity: Option<Identity>) {
        *self.current.write().unwrap() = identity.clone();
        self.signal.send_replace(SessionSignal::Resolved(identity));
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().unwrap().len()
    }

    fn check_forced_error(&self) -> Result<(), AuthError> {
        match self.force_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn publish_current(&self) {
        let identity = self.current.read().unwrap().clone();
        self.signal.send_replace(SessionSignal::Resolved(identity));
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        self.check_forced_error()?;

        if password.expose_secret().len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidCredentials);
        }

        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::AccountExists);
        }

        let uid = format!("mock-uid-{}", self.next_uid.fetch_add(1, Ordering::Relaxed));
        let identity = Identity::new(UserId::new(uid).expect("generated uid"), email);
        accounts.insert(
            email.to_string(),
            Account {
                password: password.expose_secret().clone(),
                identity: identity.clone(),
            },
        );
        drop(accounts);

        *self.current.write().unwrap() = Some(identity.clone());
        self.publish_current();
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        self.check_forced_error()?;

        let mut accounts = self.accounts.write().unwrap();
        let account = accounts.get_mut(email).ok_or(AuthError::AccountNotFound)?;
        if account.password != *password.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }
        account.identity.last_sign_in_at = Utc::now();
        let identity = account.identity.clone();
        drop(accounts);

        *self.current.write().unwrap() = Some(identity.clone());
        self.publish_current();
        Ok(identity)
    }

    async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        self.check_forced_error()?;

        let identity = self
            .federated_identity
            .read()
            .unwrap()
            .clone()
            .ok_or(AuthError::PopupClosed)?;

        *self.current.write().unwrap() = Some(identity.clone());
        self.publish_current();
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_forced_error()?;

        *self.current.write().unwrap() = None;
        self.publish_current();
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AuthError> {
        self.check_forced_error()?;

        let mut current = self.current.write().unwrap();
        let identity = current.as_mut().ok_or(AuthError::NotAuthenticated)?;
        identity.apply(update);

        // Keep the stored account in sync with its live session.
        let mut accounts = self.accounts.write().unwrap();
        if let Some(account) = accounts.get_mut(&identity.email) {
            account.identity.apply(update);
        }
        Ok(())
    }

    fn session_signal(&self) -> watch::Receiver<SessionSignal> {
        self.signal.subscribe()
    }
}
