//! Ports: async traits at the seams to external collaborators.
//!
//! The identity provider and the course backend are consumed exclusively
//! through these traits; adapters supply the production and test
//! implementations.

mod course_catalog;
mod enrollments;
mod identity_provider;

pub use course_catalog::CourseCatalog;
pub use enrollments::Enrollments;
pub use identity_provider::{
    FederatedCredential, FederatedTokenSource, IdentityProvider, SessionSignal,
};
