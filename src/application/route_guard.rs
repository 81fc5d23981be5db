//! RouteGuard - admission control bound to the session store.
//!
//! The routing layer wraps each protected view in a guard; the guard
//! consults the store's current snapshot and produces the
//! Pending/Denied/Allowed decision of [`crate::domain::admit`].

use std::sync::Arc;

use crate::domain::{admit, RouteDecision};

use super::session_store::SessionStore;

/// Access-control checkpoint for protected views.
#[derive(Clone)]
pub struct RouteGuard {
    store: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Decides admission for one navigation attempt. Evaluated fresh on
    /// every call; nothing is persisted across attempts.
    pub fn admit(&self, requested_path: &str) -> RouteDecision {
        admit(&self.store.snapshot(), requested_path)
    }
}
