//! Enrollments port.

use async_trait::async_trait;

use crate::domain::{ApiError, CourseId, Enrollment};

/// Access to the backend's enrollment records.
///
/// Users are keyed by email here because that is the key the backend
/// stores; the identity provider's uid never crosses this boundary.
///
/// # Contract
///
/// Implementations must:
/// - Return `ApiError::AlreadyEnrolled` when enrolling twice in the same
///   course
/// - Return `ApiError::NotFound` when withdrawing a nonexistent enrollment
/// - Return `ApiError::Network` for transport failures
#[async_trait]
pub trait Enrollments: Send + Sync {
    /// All enrollments for the given user.
    async fn enrollments_for(&self, email: &str) -> Result<Vec<Enrollment>, ApiError>;

    /// Whether the user is enrolled in the course.
    async fn is_enrolled(&self, email: &str, course_id: &CourseId) -> Result<bool, ApiError>;

    /// Enrolls the user, returning the stored record.
    async fn enroll(&self, email: &str, course_id: &CourseId) -> Result<Enrollment, ApiError>;

    /// Withdraws the user's enrollment.
    async fn withdraw(&self, email: &str, course_id: &CourseId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollments_trait_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn Enrollments) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn Enrollments>>();
    }
}
