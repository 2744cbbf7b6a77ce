//! Authoring-side API: draft editing, submission formatting, search
//! debouncing and a typed client for the course endpoints.

pub mod debounce;
pub mod editor;
pub mod submission;

pub use debounce::{Debouncer, DEFAULT_QUIESCENCE};
pub use editor::{ContentBlock, ContentInput, CourseDraft, DocumentFile, DraftEditor, EditorError};
pub use submission::CourseSubmission;

use http::StatusCode;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Course, CoursePage, UpdateCourseReq};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no response from server: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unauthorized")]
    Unauthorized(Option<String>),
    #[error("forbidden")]
    Forbidden(Option<String>),
    #[error("not found")]
    NotFound(Option<String>),
    #[error("request failed with {status}")]
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(_) | ClientError::Decode(_) => None,
        }
    }

    /// Text to show the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => "Network error. Please check your connection.".into(),
            ClientError::Unauthorized(_) => "Your session has expired. Please login again.".into(),
            ClientError::Forbidden(msg) => format!(
                "Permission denied: {}",
                msg.as_deref()
                    .unwrap_or("You do not have permission to perform this action.")
            ),
            ClientError::NotFound(msg) => msg
                .clone()
                .unwrap_or_else(|| "API endpoint not found. Please check server configuration.".into()),
            ClientError::Api { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Request failed. Please try again.".into()),
            ClientError::Decode(_) => "Invalid response format from server".into(),
        }
    }
}

/// Listing filters as sent in the query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseFilters {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Default for CourseFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            limit: None,
        }
    }
}

impl CourseFilters {
    /// A new search term starts again from the first page.
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: 1,
            limit: self.limit,
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ListEnvelope {
    data: CoursePage,
}

#[derive(Deserialize)]
struct CreatedEnvelope {
    course: Course,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    message: String,
}

/// REST client for the course endpoints. `base_url` includes the API prefix,
/// e.g. `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    pub async fn fetch_courses(&self, filters: &CourseFilters) -> Result<CoursePage, ClientError> {
        let rb = self.request(Method::GET, "/courses").query(filters);
        let envelope: ListEnvelope = send(rb).await?;
        Ok(envelope.data)
    }

    pub async fn create_course(&self, submission: &CourseSubmission) -> Result<Course, ClientError> {
        let rb = self.request(Method::POST, "/courses").json(submission);
        let envelope: CreatedEnvelope = send(rb).await?;
        Ok(envelope.course)
    }

    pub async fn update_course(
        &self,
        id: Uuid,
        changes: &UpdateCourseReq,
    ) -> Result<Course, ClientError> {
        let rb = self.request(Method::PUT, &format!("/courses/{id}")).json(changes);
        send(rb).await
    }

    pub async fn enroll(&self, course_id: Uuid) -> Result<String, ClientError> {
        let rb = self.request(Method::POST, &format!("/courses/enroll/{course_id}"));
        let envelope: MessageEnvelope = send(rb).await?;
        Ok(envelope.message)
    }
}

async fn send<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, ClientError> {
    let resp = rb.send().await.map_err(ClientError::Network)?;
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(ClientError::Decode);
    }

    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message.or(b.error));
    tracing::debug!(%status, ?message, "request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Api { status, message },
    })
}
