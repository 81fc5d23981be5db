//! Process-wide session state.
//!
//! A `Session` holds the cached identity (or none) and the initialization
//! flag. Fields are private: writes go through crate-internal mutators so
//! the session store remains the only writer.

use super::identity::Identity;

/// Current authentication state of the application.
///
/// # Invariant
///
/// `is_initializing` transitions exactly once, from true to false, and
/// never back. `identity` may flip between present and absent arbitrarily
/// many times, but only after initialization has resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
    is_initializing: bool,
}

impl Session {
    /// The state at application start: no identity, provider not yet heard
    /// from. Protected-route decisions must defer while in this state.
    pub fn initializing() -> Self {
        Self {
            identity: None,
            is_initializing: true,
        }
    }

    /// The cached identity, if signed in.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// True until the first provider notification has been applied.
    pub fn is_initializing(&self) -> bool {
        self.is_initializing
    }

    /// True if initialization has resolved and an identity is present.
    pub fn is_authenticated(&self) -> bool {
        !self.is_initializing && self.identity.is_some()
    }

    /// Applies an authoritative provider notification: replaces the
    /// identity and marks initialization resolved.
    pub(crate) fn resolve(&mut self, identity: Option<Identity>) {
        self.identity = identity;
        self.is_initializing = false;
    }

    /// Applies a local optimistic write from a mutation's own result.
    /// Does not touch the initialization flag.
    pub(crate) fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    /// Mutable access to the cached identity for in-place merges.
    pub(crate) fn identity_mut(&mut self) -> Option<&mut Identity> {
        self.identity.as_mut()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}
