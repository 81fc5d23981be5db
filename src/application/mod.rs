//! Application services: the session store and the route guard.

mod route_guard;
mod session_store;

pub use route_guard::RouteGuard;
pub use session_store::{SessionListener, SessionStore};
