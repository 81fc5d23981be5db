//! Error taxonomies for the client core.
//!
//! These errors are **domain-centric** - they describe what went wrong from
//! the application's perspective, not the external service's. Adapters map
//! provider-specific failures onto them at the boundary. All variants are
//! recoverable; none are fatal to the process.

use thiserror::Error;

/// A required identifier field was empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must not be empty")]
pub struct EmptyField {
    /// Name of the offending field.
    pub field: &'static str,
}

impl EmptyField {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

/// Errors surfaced by identity operations.
///
/// The session store never swallows these: the initiating view owns the
/// user-visible messaging.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The email/password pair was rejected, or the password fails the
    /// provider's policy during account creation.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("An account with this email already exists")]
    AccountExists,

    /// No account exists for this email.
    #[error("No account found for this email")]
    AccountNotFound,

    /// The federated sign-in flow was abandoned before completing.
    #[error("Sign-in window was closed before completing")]
    PopupClosed,

    /// Transport failure reaching the identity provider.
    #[error("Identity provider unreachable: {0}")]
    Network(String),

    /// The operation requires an active session and none exists.
    #[error("No active session")]
    NotAuthenticated,
}

impl AuthError {
    /// Creates a network error with a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Network(_))
    }

    /// Returns true if this error means the user must sign in first.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated)
    }
}

/// Errors surfaced by the course backend clients.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The requested resource does not exist (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    /// The user is already enrolled in this course (HTTP 409).
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    /// Transport failure reaching the backend.
    #[error("Course backend unreachable: {0}")]
    Network(String),

    /// The backend answered with an unanticipated status.
    #[error("Unexpected backend response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl ApiError {
    /// Creates a network error with a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an unexpected-response error.
    pub fn unexpected(status: u16, message: impl Into<String>) -> Self {
        Self::Unexpected {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}
