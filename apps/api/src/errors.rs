use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::RepoError;
use crate::upload::policy::PolicyViolation;

/// JSON body of every non-2xx response from the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A secret the feature depends on is not configured.
    #[error("{0}")]
    Misconfigured(&'static str),

    #[error("Invalid or missing upload token")]
    Unauthorized,

    #[error("No file uploaded")]
    MissingFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File is too large (limit {limit} bytes)")]
    TooLarge { limit: u64 },

    #[error("Malformed upload: {0}")]
    BadMultipart(String),

    /// The revision marker went stale between the read and the write.
    #[error("Revision conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Upstream(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict { message } => AppError::Conflict(message),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<PolicyViolation> for AppError {
    fn from(violation: PolicyViolation) -> Self {
        match violation {
            PolicyViolation::TooLarge { limit, .. } => AppError::TooLarge { limit },
            PolicyViolation::UnsupportedType(mime) => AppError::UnsupportedType(mime),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MissingFile | AppError::BadMultipart(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, detail) = match self {
            AppError::Misconfigured(msg) => (msg.to_string(), None),
            AppError::Unauthorized | AppError::MissingFile => (self.to_string(), None),
            AppError::UnsupportedType(mime) => {
                ("Unsupported file type".to_string(), Some(mime.clone()))
            }
            AppError::TooLarge { limit, .. } => (
                format!(
                    "File is too large. Please upload a file smaller than {}MB.",
                    limit / (1024 * 1024)
                ),
                None,
            ),
            AppError::BadMultipart(msg) => ("Malformed upload".to_string(), Some(msg.clone())),
            AppError::Conflict(msg) => {
                tracing::warn!("Revision conflict while publishing: {msg}");
                (
                    "Resume was changed in the repository while uploading; retry the upload"
                        .to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Commit error: {msg}");
                (
                    "Failed to commit file to GitHub".to_string(),
                    Some(msg.clone()),
                )
            }
        };
        ErrorBody { message, detail }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
