//! Identity types cached from the identity provider.
//!
//! The provider owns the canonical record; the session store holds a
//! read-mostly copy of it. Any provider can populate these types through
//! the `IdentityProvider` port.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::EmptyField;

/// Opaque stable user identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning an error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyField> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyField::new("uid"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cached profile of the authenticated user.
///
/// `uid` is immutable; `display_name` and `photo_url` are mutable via
/// profile update. Timestamps are provider-managed.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Stable identifier from the identity provider.
    pub uid: UserId,

    /// Email address; may be empty for federated-only accounts.
    pub email: String,

    /// Display name if set.
    pub display_name: Option<String>,

    /// Avatar URL if set.
    pub photo_url: Option<String>,

    /// Whether the provider has verified the email.
    pub email_verified: bool,

    /// Account creation time.
    pub created_at: DateTime<Utc>,

    /// Most recent sign-in time.
    pub last_sign_in_at: DateTime<Utc>,
}

impl Identity {
    /// Creates an identity with the given uid and email; remaining fields
    /// start unset. Adapters overwrite the timestamps from provider data.
    pub fn new(uid: UserId, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid,
            email: email.into(),
            display_name: None,
            photo_url: None,
            email_verified: false,
            created_at: now,
            last_sign_in_at: now,
        }
    }

    /// Returns the display name, or the email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// Merges accepted profile fields into this identity,
    /// last-write-wins, field-by-field.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(url) = &update.photo_url {
            self.photo_url = Some(url.clone());
        }
    }
}

/// Partial profile change: only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the photo URL.
    pub fn photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}
