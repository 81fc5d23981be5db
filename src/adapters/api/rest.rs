//! REST adapter for the course backend.
//!
//! Implements both backend ports against the JSON API:
//!
//! - `/courses` and `/courses/{id}` for the catalog
//! - `/enrollments`, `/enrollments/check` for enrollment records
//!
//! The backend keys enrollments by user email and responds with `409` on
//! duplicate enrollment and `404` on unknown records; both are mapped
//! onto the domain `ApiError` taxonomy here so callers never see raw
//! status codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::domain::{ApiError, Course, CourseDraft, CourseId, Enrollment, EnrollmentId};
use crate::ports::{CourseCatalog, Enrollments};

/// HTTP client for the course backend.
#[derive(Debug, Clone)]
pub struct RestBackend {
    base_url: String,
    http: reqwest::Client,
}

impl RestBackend {
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::network(format!("malformed backend response: {e}")))
    }

    async fn read_empty(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for RestBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let response = self
            .http
            .get(self.url("/courses"))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dtos: Vec<CourseDto> = Self::read_json(response).await?;
        dtos.into_iter().map(CourseDto::into_course).collect()
    }

    async fn course(&self, id: &CourseId) -> Result<Course, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/courses/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dto: CourseDto = Self::read_json(response).await?;
        dto.into_course()
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<Course, ApiError> {
        tracing::debug!(title = %draft.title, "creating course");
        let response = self
            .http
            .post(self.url("/courses"))
            .json(&CourseDraftDto::from(&draft))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dto: CourseDto = Self::read_json(response).await?;
        dto.into_course()
    }

    async fn update_course(&self, id: &CourseId, draft: CourseDraft) -> Result<Course, ApiError> {
        tracing::debug!(course_id = %id, "updating course");
        let response = self
            .http
            .put(self.url(&format!("/courses/{id}")))
            .json(&CourseDraftDto::from(&draft))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dto: CourseDto = Self::read_json(response).await?;
        dto.into_course()
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), ApiError> {
        tracing::debug!(course_id = %id, "deleting course");
        let response = self
            .http
            .delete(self.url(&format!("/courses/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Self::read_empty(response).await
    }
}

#[async_trait]
impl Enrollments for RestBackend {
    async fn enrollments_for(&self, email: &str) -> Result<Vec<Enrollment>, ApiError> {
        let response = self
            .http
            .get(self.url("/enrollments"))
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dtos: Vec<EnrollmentDto> = Self::read_json(response).await?;
        dtos.into_iter().map(EnrollmentDto::into_enrollment).collect()
    }

    async fn is_enrolled(&self, email: &str, course_id: &CourseId) -> Result<bool, ApiError> {
        let response = self
            .http
            .get(self.url("/enrollments/check"))
            .query(&[("email", email), ("courseId", course_id.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let check: EnrollmentCheck = Self::read_json(response).await?;
        Ok(check.enrolled)
    }

    async fn enroll(&self, email: &str, course_id: &CourseId) -> Result<Enrollment, ApiError> {
        tracing::debug!(course_id = %course_id, "enrolling");
        let response = self
            .http
            .post(self.url("/enrollments"))
            .json(&EnrollmentRequest {
                email,
                course_id: course_id.as_str(),
            })
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let dto: EnrollmentDto = Self::read_json(response).await?;
        dto.into_enrollment()
    }

    async fn withdraw(&self, email: &str, course_id: &CourseId) -> Result<(), ApiError> {
        tracing::debug!(course_id = %course_id, "withdrawing");
        // The backend takes the withdrawal key in the DELETE body.
        let response = self
            .http
            .delete(self.url("/enrollments"))
            .json(&EnrollmentRequest {
                email,
                course_id: course_id.as_str(),
            })
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Self::read_empty(response).await
    }
}

fn map_status(status: u16, body: &str) -> ApiError {
    match status {
        404 => ApiError::NotFound,
        409 => ApiError::AlreadyEnrolled,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.to_string());
            ApiError::unexpected(status, message)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Course record as the backend serializes it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseDto {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    full_description: Option<String>,
    #[serde(rename = "imageURL", default)]
    image_url: String,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    created_by: String,
    #[serde(default)]
    creator_name: Option<String>,
    #[serde(default)]
    enroll_count: u64,
    created_at: DateTime<Utc>,
}

impl CourseDto {
    fn into_course(self) -> Result<Course, ApiError> {
        let id = CourseId::new(self.id)
            .map_err(|e| ApiError::network(format!("malformed backend response: {e}")))?;
        Ok(Course {
            id,
            title: self.title,
            short_description: self.short_description,
            full_description: self.full_description,
            image_url: self.image_url,
            duration: self.duration,
            created_by: self.created_by,
            creator_name: self.creator_name,
            enroll_count: self.enroll_count,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseDraftDto<'a> {
    title: &'a str,
    short_description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_description: Option<&'a str>,
    #[serde(rename = "imageURL")]
    image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<&'a str>,
    created_by: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator_name: Option<&'a str>,
}

impl<'a> From<&'a CourseDraft> for CourseDraftDto<'a> {
    fn from(draft: &'a CourseDraft) -> Self {
        Self {
            title: &draft.title,
            short_description: &draft.short_description,
            full_description: draft.full_description.as_deref(),
            image_url: &draft.image_url,
            duration: draft.duration.as_deref(),
            created_by: &draft.created_by,
            creator_name: draft.creator_name.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentDto {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    course_id: String,
    #[serde(default)]
    course_title: String,
    #[serde(default)]
    course_description: Option<String>,
    created_at: DateTime<Utc>,
}

impl EnrollmentDto {
    fn into_enrollment(self) -> Result<Enrollment, ApiError> {
        let id = EnrollmentId::new(self.id)
            .map_err(|e| ApiError::network(format!("malformed backend response: {e}")))?;
        let course_id = CourseId::new(self.course_id)
            .map_err(|e| ApiError::network(format!("malformed backend response: {e}")))?;
        Ok(Enrollment {
            id,
            email: self.email,
            course_id,
            course_title: self.course_title,
            course_description: self.course_description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentRequest<'a> {
    email: &'a str,
    course_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct EnrollmentCheck {
    enrolled: bool,
}
