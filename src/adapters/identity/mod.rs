//! Identity provider adapters.

mod http;
mod mock;

pub use http::HttpIdentityProvider;
pub use mock::MockIdentityProvider;
