//! SessionStore - single source of truth for "who is logged in".
//!
//! The store is constructed once at application start via
//! [`SessionStore::start`], which also acquires the provider session
//! subscription. The returned [`SessionListener`] releases the
//! subscription when dropped, so no listener outlives the application.
//!
//! Two writers touch the cached identity:
//! - the provider signal listener, the authoritative writer, which also
//!   resolves the initialization flag on first delivery;
//! - the mutation methods, which write optimistically from their own
//!   resolved result. The authoritative notification may overwrite such a
//!   write moments later with an equal value; that double-write is
//!   expected and tolerated.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{AuthError, Identity, ProfileUpdate, Session};
use crate::ports::{IdentityProvider, SessionSignal};

/// Process-wide holder of the current identity and initialization state,
/// and the only component permitted to invoke identity-provider mutations.
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<Session>,
    changed: watch::Sender<Session>,
}

/// Handle for the provider-signal subscription. Dropping it cancels the
/// listener task; `shutdown` does the same explicitly at teardown.
pub struct SessionListener {
    handle: JoinHandle<()>,
}

impl SessionListener {
    /// Releases the subscription.
    pub fn shutdown(self) {}
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl SessionStore {
    /// Builds the store and subscribes to the provider's session signal.
    ///
    /// The session starts in the initializing state; the first resolved
    /// signal from the provider flips it, exactly once, for the lifetime
    /// of the process.
    pub fn start(provider: Arc<dyn IdentityProvider>) -> (Arc<Self>, SessionListener) {
        let session = Session::initializing();
        let (changed, _) = watch::channel(session.clone());
        let store = Arc::new(Self {
            provider: provider.clone(),
            state: RwLock::new(session),
            changed,
        });

        let mut signal = provider.session_signal();
        let weak = Arc::downgrade(&store);
        let handle = tokio::spawn(async move {
            loop {
                // Apply the current value before waiting, in case the
                // provider resolved before we subscribed.
                let current = signal.borrow_and_update().clone();
                if let SessionSignal::Resolved(identity) = current {
                    match weak.upgrade() {
                        Some(store) => store.apply_signal(identity),
                        None => break,
                    }
                }
                if signal.changed().await.is_err() {
                    break;
                }
            }
        });

        (store, SessionListener { handle })
    }

    /// A point-in-time copy of the session, for guards and views.
    pub fn snapshot(&self) -> Session {
        self.state.read().expect("session lock poisoned").clone()
    }

    /// Subscribes to session changes; the receiver always holds the
    /// latest value, so dependent views re-render without a round trip.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.changed.subscribe()
    }

    /// Creates a new account. When `display_name` is supplied, a profile
    /// update is issued immediately so the returned identity already
    /// carries it, even if the provider's own record lags.
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountExists` - the email is already registered
    /// * `AuthError::InvalidCredentials` - the password fails provider policy
    /// * `AuthError::Network` - transport failure
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let mut identity = self.provider.create_account(email, password).await?;

        if let Some(name) = display_name {
            let update = ProfileUpdate::new().display_name(name);
            self.provider.update_profile(&update).await?;
            identity.apply(&update);
        }

        tracing::debug!(uid = %identity.uid, "account created");
        self.cache_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountNotFound` - no account for this email
    /// * `AuthError::InvalidCredentials` - password rejected
    /// * `AuthError::Network` - transport failure
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in(email, password).await?;
        tracing::debug!(uid = %identity.uid, "signed in");
        self.cache_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Signs in through the federated popup/redirect flow.
    ///
    /// # Errors
    ///
    /// * `AuthError::PopupClosed` - the user abandoned the flow
    /// * `AuthError::Network` - transport failure
    pub async fn sign_in_federated(&self) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in_federated().await?;
        tracing::debug!(uid = %identity.uid, "signed in via federated provider");
        self.cache_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Signs out. The cached identity is cleared only after the provider
    /// confirms: a UI claiming "logged out" while the provider-side
    /// session persists is worse than surfacing the failure.
    ///
    /// # Errors
    ///
    /// * `AuthError::Network` - the remote call could not complete; the
    ///   cached identity is left unchanged
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        tracing::debug!("signed out");
        self.cache_identity(None);
        Ok(())
    }

    /// Applies profile changes and merges the accepted fields into the
    /// cached identity, last-write-wins, field-by-field.
    ///
    /// # Errors
    ///
    /// * `AuthError::NotAuthenticated` - no active session
    /// * `AuthError::Network` - transport failure
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), AuthError> {
        if self.snapshot().identity().is_none() {
            return Err(AuthError::NotAuthenticated);
        }

        self.provider.update_profile(&update).await?;

        let mut state = self.state.write().expect("session lock poisoned");
        if let Some(identity) = state.identity_mut() {
            identity.apply(&update);
        }
        self.changed.send_replace(state.clone());
        Ok(())
    }

    /// Authoritative write from the provider signal listener.
    fn apply_signal(&self, identity: Option<Identity>) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.resolve(identity);
        self.changed.send_replace(state.clone());
    }

    /// Optimistic write from a mutation's own result.
    fn cache_identity(&self, identity: Option<Identity>) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.set_identity(identity);
        self.changed.send_replace(state.clone());
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::MockIdentityProvider;
    use crate::domain::UserId;
    use std::time::Duration;

    fn password(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    fn test_identity(uid: &str, email: &str) -> Identity {
        Identity::new(UserId::new(uid).unwrap(), email)
    }

    /// Waits until the store's watch channel satisfies the predicate.
    async fn wait_for(
        store: &SessionStore,
        predicate: impl FnMut(&Session) -> bool,
    ) -> Session {
        let mut rx = store.watch();
        let session = tokio::time::timeout(Duration::from_secs(1), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for session change")
            .expect("session channel closed")
            .clone();
        session
    }

    #[tokio::test]
    async fn starts_initializing_until_provider_resolves() {
        let provider = Arc::new(MockIdentityProvider::new());
        let (store, _listener) = SessionStore::start(provider.clone());

        assert!(store.snapshot().is_initializing());

        provider.resolve_initial(None);
        let session = wait_for(&store, |s| !s.is_initializing()).await;
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn initial_resolution_with_restored_identity() {
        let provider = Arc::new(MockIdentityProvider::new());
        let (store, _listener) = SessionStore::start(provider.clone());

        provider.resolve_initial(Some(test_identity("u1", "ada@example.com")));
        let session = wait_for(&store, |s| !s.is_initializing()).await;
        assert_eq!(session.identity().unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn resolution_received_before_listener_subscribes_is_not_lost() {
        let provider = Arc::new(MockIdentityProvider::new());
        // Resolve before the store exists at all.
        provider.resolve_initial(None);

        let (store, _listener) = SessionStore::start(provider);
        let session = wait_for(&store, |s| !s.is_initializing()).await;
        assert!(!session.is_initializing());
    }

    #[tokio::test]
    async fn sign_in_caches_identity() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_account("ada@example.com", "Passw0rd!", test_identity("u1", "ada@example.com")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let identity = store
            .sign_in("ada@example.com", &password("Passw0rd!"))
            .await
            .unwrap();
        assert_eq!(identity.email, "ada@example.com");
        assert!(store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn sign_in_with_wrong_password_surfaces_error() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_account("ada@example.com", "Passw0rd!", test_identity("u1", "ada@example.com")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let result = store.sign_in("ada@example.com", &password("nope")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn sign_up_with_display_name_returns_named_identity() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let identity = store
            .sign_up("a@x.com", &password("Passw0rd!"), Some("Ada"))
            .await
            .unwrap();

        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert_eq!(
            store.snapshot().identity().unwrap().display_name.as_deref(),
            Some("Ada")
        );
    }

    #[tokio::test]
    async fn sign_up_duplicate_email_fails() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_account("a@x.com", "Passw0rd!", test_identity("u1", "a@x.com")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let result = store.sign_up("a@x.com", &password("Other1!"), None).await;
        assert!(matches!(result, Err(AuthError::AccountExists)));
    }

    #[tokio::test]
    async fn federated_sign_in_caches_identity_and_notifies_watchers() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_federated_identity(test_identity("g1", "ada@gmail.example")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let identity = store.sign_in_federated().await.unwrap();
        assert_eq!(identity.email, "ada@gmail.example");

        let session = wait_for(&store, |s| s.is_authenticated()).await;
        assert_eq!(session.identity().unwrap().uid.as_str(), "g1");
    }

    #[tokio::test]
    async fn abandoned_federated_sign_in_leaves_session_unchanged() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let result = store.sign_in_federated().await;
        assert!(matches!(result, Err(AuthError::PopupClosed)));
        assert!(!store.snapshot().is_authenticated());
        assert!(!store.snapshot().is_initializing());
    }

    #[tokio::test]
    async fn sign_out_failure_leaves_identity_in_place() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_account("ada@example.com", "Passw0rd!", test_identity("u1", "ada@example.com")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider.clone());
        wait_for(&store, |s| !s.is_initializing()).await;

        store
            .sign_in("ada@example.com", &password("Passw0rd!"))
            .await
            .unwrap();

        provider.set_error(AuthError::network("connection reset"));
        let result = store.sign_out().await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert!(store.snapshot().is_authenticated());

        provider.clear_error();
        store.sign_out().await.unwrap();
        assert!(!store.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn update_profile_without_session_fails() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        let result = store
            .update_profile(ProfileUpdate::new().display_name("X"))
            .await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn update_profile_twice_with_same_value_is_idempotent() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        store
            .sign_up("a@x.com", &password("Passw0rd!"), None)
            .await
            .unwrap();

        let update = ProfileUpdate::new().display_name("X");
        store.update_profile(update.clone()).await.unwrap();
        let after_once = store.snapshot().identity().cloned();

        store.update_profile(update).await.unwrap();
        let after_twice = store.snapshot().identity().cloned();

        assert_eq!(after_once, after_twice);
    }

    #[tokio::test]
    async fn authoritative_signal_overwrites_optimistic_write() {
        let provider = Arc::new(MockIdentityProvider::new());
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider.clone());
        wait_for(&store, |s| !s.is_initializing()).await;

        store
            .sign_up("a@x.com", &password("Passw0rd!"), None)
            .await
            .unwrap();

        // Provider-side expiry: the signal listener clears the identity.
        provider.emit(None);
        let session = wait_for(&store, |s| s.identity().is_none()).await;
        assert!(!session.is_initializing());
    }

    #[tokio::test]
    async fn initializing_resolves_exactly_once_across_auth_cycles() {
        let provider = Arc::new(
            MockIdentityProvider::new()
                .with_account("ada@example.com", "Passw0rd!", test_identity("u1", "ada@example.com")),
        );
        provider.resolve_initial(None);
        let (store, _listener) = SessionStore::start(provider);
        wait_for(&store, |s| !s.is_initializing()).await;

        for _ in 0..3 {
            store
                .sign_in("ada@example.com", &password("Passw0rd!"))
                .await
                .unwrap();
            assert!(!store.snapshot().is_initializing());
            store.sign_out().await.unwrap();
            assert!(!store.snapshot().is_initializing());
        }
    }

    #[tokio::test]
    async fn listener_drop_releases_subscription() {
        let provider = Arc::new(MockIdentityProvider::new());
        let (store, listener) = SessionStore::start(provider.clone());

        listener.shutdown();
        // Give the aborted task a moment to wind down.
        tokio::task::yield_now().await;

        provider.resolve_initial(None);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // No listener: the store never saw the resolution.
        assert!(store.snapshot().is_initializing());
    }
}
