//! Course listing types mirrored from the backend.
//!
//! The backend owns these records; this crate only reads and submits them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::EmptyField;

/// Backend-assigned course identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Creates a new CourseId, returning an error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyField> {
        let id = id.into();
        if id.is_empty() {
            return Err(EmptyField::new("course_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published course listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub full_description: Option<String>,
    pub image_url: String,
    /// Free-form duration label, e.g. "6 weeks".
    pub duration: Option<String>,
    /// Email of the instructor who created the listing.
    pub created_by: String,
    pub creator_name: Option<String>,
    pub enroll_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// True if the given email belongs to the instructor who created this
    /// listing (edit/delete controls are shown only to them).
    pub fn is_created_by(&self, email: &str) -> bool {
        self.created_by == email
    }
}

/// The writable subset of a course listing, for create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub short_description: String,
    pub full_description: Option<String>,
    pub image_url: String,
    pub duration: Option<String>,
    pub created_by: String,
    pub creator_name: Option<String>,
}
