//! Identity provider port.
//!
//! The only surface through which the crate talks to the external identity
//! service. The session store is the sole caller of the mutation methods;
//! everything else reads session state through the store.
//!
//! Session changes are observed through an explicit subscription object:
//! `session_signal` hands out a watch receiver whose lifetime is the
//! cancellation handle.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::watch;

use crate::domain::{AuthError, Identity, ProfileUpdate};

/// Provider-side view of the session, published on the signal channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// The provider has not yet determined whether a session exists
    /// (e.g. a persisted token is still being verified).
    Initializing,

    /// The provider resolved: signed in with the given identity, or
    /// signed out (`None`).
    Resolved(Option<Identity>),
}

impl SessionSignal {
    /// Returns the resolved identity, if the signal has resolved.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionSignal::Initializing => None,
            SessionSignal::Resolved(identity) => identity.as_ref(),
        }
    }
}

/// Operations delegated to the external identity service.
///
/// # Contract
///
/// Implementations must:
/// - Map provider-specific failures onto the `AuthError` taxonomy
/// - Publish `SessionSignal::Resolved(..)` after every successful
///   sign-up, sign-in, and sign-out
/// - Resolve the signal exactly once at startup, even when no session
///   can be restored (`Resolved(None)`)
/// - Never log password material
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a new account and signs it in.
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountExists` - the email is already registered
    /// * `AuthError::InvalidCredentials` - the password fails provider policy
    /// * `AuthError::Network` - transport failure
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError>;

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountNotFound` - no account for this email
    /// * `AuthError::InvalidCredentials` - password rejected
    /// * `AuthError::Network` - transport failure
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError>;

    /// Completes a federated (popup/redirect) sign-in flow.
    ///
    /// # Errors
    ///
    /// * `AuthError::PopupClosed` - the user abandoned the flow
    /// * `AuthError::Network` - transport failure
    async fn sign_in_federated(&self) -> Result<Identity, AuthError>;

    /// Ends the provider-side session.
    ///
    /// # Errors
    ///
    /// * `AuthError::Network` - the remote call could not complete; the
    ///   provider-side session must be assumed still live
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Applies profile changes to the active session's account.
    ///
    /// # Errors
    ///
    /// * `AuthError::NotAuthenticated` - no active session
    /// * `AuthError::Network` - transport failure
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AuthError>;

    /// Subscribes to provider session changes. The receiver starts at the
    /// channel's current value; dropping it releases the subscription.
    fn session_signal(&self) -> watch::Receiver<SessionSignal>;
}

/// Credential produced by an external federated sign-in flow.
///
/// The popup/redirect interaction itself lives outside this crate; the
/// host application runs it and hands the resulting OAuth credential back
/// through `FederatedTokenSource`.
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// Federated provider identifier, e.g. `"google.com"`.
    pub provider_id: String,

    /// The OAuth ID token issued by the federated provider.
    pub id_token: SecretString,

    /// The redirect URI the flow completed on.
    pub request_uri: String,
}

/// Runs the external popup/redirect flow to completion.
///
/// # Contract
///
/// Implementations must return `AuthError::PopupClosed` when the user
/// abandons the flow, and `AuthError::Network` for transport failures.
#[async_trait]
pub trait FederatedTokenSource: Send + Sync {
    async fn acquire(&self) -> Result<FederatedCredential, AuthError>;
}
