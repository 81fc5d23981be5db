//! In-memory course backend for testing.
//!
//! Mirrors the REST backend's observable behavior: duplicate enrollment
//! yields `AlreadyEnrolled`, unknown records yield `NotFound`, and the
//! course's `enroll_count` tracks enrollments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    ApiError, Course, CourseDraft, CourseId, Enrollment, EnrollmentId,
};
use crate::ports::{CourseCatalog, Enrollments};

#[derive(Default)]
struct State {
    courses: HashMap<CourseId, Course>,
    enrollments: Vec<Enrollment>,
}

/// In-memory stand-in for the course backend.
#[derive(Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
    force_error: RwLock<Option<ApiError>>,
    next_id: AtomicU64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            force_error: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seeds a course.
    pub fn with_course(self, course: Course) -> Self {
        self.state
            .write()
            .unwrap()
            .courses
            .insert(course.id.clone(), course);
        self
    }

    /// Forces all operations to return the specified error.
    pub fn with_error(self, error: ApiError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Forces all operations to return the specified error, at runtime.
    pub fn set_error(&self, error: ApiError) {
        *self.force_error.write().unwrap() = Some(error);
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    fn check_forced_error(&self) -> Result<(), ApiError> {
        match self.force_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl CourseCatalog for InMemoryBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.check_forced_error()?;
        let state = self.state.read().unwrap();
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn course(&self, id: &CourseId) -> Result<Course, ApiError> {
        self.check_forced_error()?;
        self.state
            .read()
            .unwrap()
            .courses
            .get(id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<Course, ApiError> {
        self.check_forced_error()?;
        let id = CourseId::new(self.next_id("course")).expect("generated id");
        let course = Course {
            id: id.clone(),
            title: draft.title,
            short_description: draft.short_description,
            full_description: draft.full_description,
            image_url: draft.image_url,
            duration: draft.duration,
            created_by: draft.created_by,
            creator_name: draft.creator_name,
            enroll_count: 0,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .unwrap()
            .courses
            .insert(id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: &CourseId, draft: CourseDraft) -> Result<Course, ApiError> {
        self.check_forced_error()?;
        let mut state = self.state.write().unwrap();
        let course = state.courses.get_mut(id).ok_or(ApiError::NotFound)?;
        course.title = draft.title;
        course.short_description = draft.short_description;
        course.full_description = draft.full_description;
        course.image_url = draft.image_url;
        course.duration = draft.duration;
        course.created_by = draft.created_by;
        course.creator_name = draft.creator_name;
        Ok(course.clone())
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), ApiError> {
        self.check_forced_error()?;
        let mut state = self.state.write().unwrap();
        state.courses.remove(id).ok_or(ApiError::NotFound)?;
        state.enrollments.retain(|e| e.course_id != *id);
        Ok(())
    }
}

#[async_trait]
impl Enrollments for InMemoryBackend {
    async fn enrollments_for(&self, email: &str) -> Result<Vec<Enrollment>, ApiError> {
        self.check_forced_error()?;
        let state = self.state.read().unwrap();
        Ok(state
            .enrollments
            .iter()
            .filter(|e| e.email == email)
            .cloned()
            .collect())
    }

    async fn is_enrolled(&self, email: &str, course_id: &CourseId) -> Result<bool, ApiError> {
        self.check_forced_error()?;
        let state = self.state.read().unwrap();
        Ok(state
            .enrollments
            .iter()
            .any(|e| e.email == email && e.course_id == *course_id))
    }

    async fn enroll(&self, email: &str, course_id: &CourseId) -> Result<Enrollment, ApiError> {
        self.check_forced_error()?;
        let mut state = self.state.write().unwrap();

        if state
            .enrollments
            .iter()
            .any(|e| e.email == email && e.course_id == *course_id)
        {
            return Err(ApiError::AlreadyEnrolled);
        }

        let course = state.courses.get(course_id).ok_or(ApiError::NotFound)?;
        let enrollment = Enrollment {
            id: EnrollmentId::new(self.next_id("enrollment")).expect("generated id"),
            email: email.to_string(),
            course_id: course_id.clone(),
            course_title: course.title.clone(),
            course_description: course.full_description.clone(),
            created_at: Utc::now(),
        };

        if let Some(course) = state.courses.get_mut(course_id) {
            course.enroll_count += 1;
        }
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn withdraw(&self, email: &str, course_id: &CourseId) -> Result<(), ApiError> {
        self.check_forced_error()?;
        let mut state = self.state.write().unwrap();

        let before = state.enrollments.len();
        state
            .enrollments
            .retain(|e| !(e.email == email && e.course_id == *course_id));
        if state.enrollments.len() == before {
            return Err(ApiError::NotFound);
        }

        if let Some(course) = state.courses.get_mut(course_id) {
            course.enroll_count = course.enroll_count.saturating_sub(1);
        }
        Ok(())
    }
}
