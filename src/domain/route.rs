//! Route admission: the access-control checkpoint for protected views.
//!
//! `admit` is a pure function of session state and the requested path; it
//! performs no I/O and keeps no state of its own. Per navigation attempt
//! the decision moves `Pending -> {Denied, Allowed}` and is re-evaluated
//! fresh on the next attempt.

use super::session::Session;

/// Where denied navigations are redirected.
pub const LOGIN_PATH: &str = "/login";

/// Default destination when no navigation intent is carried.
pub const ROOT_PATH: &str = "/";

/// The path the user attempted before being redirected to login.
///
/// Carried alongside the redirect and consumed exactly once: `resume`
/// takes the intent by value, so a resumed intent cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    path: String,
}

impl NavigationIntent {
    /// Records the originally requested path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The deferred destination, consuming the intent.
    pub fn resume(self) -> String {
        self.path
    }

    /// Resolves an optional intent to a destination, defaulting to the
    /// application root when none was carried.
    pub fn resume_or_root(intent: Option<Self>) -> String {
        intent.map(Self::resume).unwrap_or_else(|| ROOT_PATH.to_string())
    }
}

/// Redirect instruction produced by a denied navigation.
///
/// The redirect replaces the current history entry rather than pushing a
/// new one, so the back button cannot loop into the guarded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Destination path (the login entry point).
    pub to: String,

    /// The originally requested path, for post-login resume.
    pub intent: NavigationIntent,
}

/// Outcome of admission control for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session state not yet known: render a neutral placeholder, neither
    /// content nor redirect. Avoids a flash-redirect on page reload.
    Pending,

    /// No identity: redirect to login, carrying the requested path.
    Denied(Redirect),

    /// Identity present: render the requested view unmodified.
    Allowed,
}

impl RouteDecision {
    pub fn is_pending(&self) -> bool {
        matches!(self, RouteDecision::Pending)
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, RouteDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RouteDecision::Denied(_))
    }
}

/// Decides admission for `requested_path` given the current session.
pub fn admit(session: &Session, requested_path: &str) -> RouteDecision {
    if session.is_initializing() {
        return RouteDecision::Pending;
    }
    match session.identity() {
        None => RouteDecision::Denied(Redirect {
            to: LOGIN_PATH.to_string(),
            intent: NavigationIntent::new(requested_path),
        }),
        Some(_) => RouteDecision::Allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, UserId};

    fn resolved_session(identity: Option<Identity>) -> Session {
        let mut session = Session::initializing();
        session.resolve(identity);
        session
    }

    fn test_identity() -> Identity {
        Identity::new(UserId::new("user-123").unwrap(), "ada@example.com")
    }

    #[test]
    fn initializing_session_is_always_pending() {
        let session = Session::initializing();
        assert!(admit(&session, "/profile").is_pending());
        assert!(admit(&session, "/").is_pending());
    }

    #[test]
    fn resolved_absent_identity_is_denied_with_intent() {
        let session = resolved_session(None);
        match admit(&session, "/profile") {
            RouteDecision::Denied(redirect) => {
                assert_eq!(redirect.to, LOGIN_PATH);
                assert_eq!(redirect.intent.resume(), "/profile");
            }
            other => panic!("expected Denied, got {other:?}"),
        }
    }

    #[test]
    fn resolved_present_identity_is_allowed() {
        let session = resolved_session(Some(test_identity()));
        assert!(admit(&session, "/profile").is_allowed());
    }

    #[test]
    fn decision_is_fresh_per_attempt() {
        let mut session = resolved_session(None);
        assert!(admit(&session, "/dashboard").is_denied());

        session.resolve(Some(test_identity()));
        assert!(admit(&session, "/dashboard").is_allowed());
    }

    #[test]
    fn missing_intent_resumes_to_root() {
        assert_eq!(NavigationIntent::resume_or_root(None), ROOT_PATH);
        assert_eq!(
            NavigationIntent::resume_or_root(Some(NavigationIntent::new("/courses/42"))),
            "/courses/42"
        );
    }
}
