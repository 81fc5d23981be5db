//! Enrollment records mirrored from the backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::CourseId;
use super::errors::EmptyField;

/// Backend-assigned enrollment identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(String);

impl EnrollmentId {
    /// Creates a new EnrollmentId, returning an error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyField> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyField::new("enrollment_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's enrollment in one course.
///
/// The backend denormalizes the course title and description into the
/// record so enrollment lists render without a second lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    /// Email of the enrolled user.
    pub email: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub course_description: Option<String>,
    pub created_at: DateTime<Utc>,
}
