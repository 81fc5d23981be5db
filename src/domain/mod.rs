//! Domain types for the client core.
//!
//! Everything here is provider-free: no HTTP, no identity-toolkit details,
//! no backend wire shapes. Adapters translate external representations into
//! these types at the boundary.

mod course;
mod enrollment;
mod errors;
mod identity;
mod route;
mod session;

pub use course::{Course, CourseDraft, CourseId};
pub use enrollment::{Enrollment, EnrollmentId};
pub use errors::{ApiError, AuthError, EmptyField};
pub use identity::{Identity, ProfileUpdate, UserId};
pub use route::{admit, NavigationIntent, Redirect, RouteDecision, LOGIN_PATH, ROOT_PATH};
pub use session::Session;
