//! Course catalog port.

use async_trait::async_trait;

use crate::domain::{ApiError, Course, CourseDraft, CourseId};

/// Read and write access to the backend's course listings.
///
/// # Contract
///
/// Implementations must:
/// - Return `ApiError::NotFound` for operations on unknown course ids
/// - Return `ApiError::Network` for transport failures
/// - Leave enrollment accounting to the backend (`enroll_count` is
///   read-only from this side)
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// All published courses.
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// One course by id.
    async fn course(&self, id: &CourseId) -> Result<Course, ApiError>;

    /// Publishes a new listing, returning the stored record.
    async fn create_course(&self, draft: CourseDraft) -> Result<Course, ApiError>;

    /// Replaces the writable fields of an existing listing.
    async fn update_course(&self, id: &CourseId, draft: CourseDraft) -> Result<Course, ApiError>;

    /// Removes a listing.
    async fn delete_course(&self, id: &CourseId) -> Result<(), ApiError>;
}
