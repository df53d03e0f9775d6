/// HTTP client for the Folio upload service.
///
/// One call per attempt and no retries: a failed upload is reported and the
/// admin decides whether to try again.
use folio_api::errors::ErrorBody;
use folio_api::upload::auth::ADMIN_TOKEN_HEADER;
use folio_api::upload::policy::PolicyViolation;
use folio_api::upload::RESUME_FIELD;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::candidate::CandidateFile;

/// Coarse classification of a failed upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught locally or by the service's own validation.
    Validation,
    Unauthorized,
    /// The résumé changed in the repository between read and write.
    Conflict,
    /// The service is misconfigured or the repository write failed.
    Server,
    Network,
    /// A 2xx answer without the expected body.
    InvalidResponse,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File is too large. Please upload a file smaller than {}MB.", mib(.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type '{0}'. Please upload a PDF, DOC or DOCX file.")]
    UnsupportedType(String),

    /// Non-2xx answer; `message` is the body text shown to the admin.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Upload succeeded but the server did not return a resume URL.")]
    MissingUrl,

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The picked file could not be read from disk.
    #[error("Could not read the selected file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PolicyViolation> for UploadError {
    fn from(violation: PolicyViolation) -> Self {
        match violation {
            PolicyViolation::TooLarge { size, limit } => UploadError::TooLarge { size, limit },
            PolicyViolation::UnsupportedType(mime) => UploadError::UnsupportedType(mime),
        }
    }
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::TooLarge { .. }
            | UploadError::UnsupportedType(_)
            | UploadError::Io(_) => ErrorKind::Validation,
            UploadError::Rejected { status, .. } => match *status {
                401 | 403 => ErrorKind::Unauthorized,
                409 => ErrorKind::Conflict,
                400..=499 => ErrorKind::Validation,
                _ => ErrorKind::Server,
            },
            UploadError::MissingUrl => ErrorKind::InvalidResponse,
            UploadError::Transport(_) => ErrorKind::Network,
        }
    }
}

/// Successful outcome of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
    pub message: Option<String>,
}

/// Success bodies are parsed leniently so a missing `url` can be reported
/// as its own error.
#[derive(Debug, Deserialize)]
struct SuccessBody {
    url: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct UploadClient {
    http: Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Uploads `file` as the new résumé. Files that fail the upload policy
    /// are rejected before any request is made.
    pub async fn upload(
        &self,
        file: &CandidateFile,
        token: &str,
    ) -> Result<UploadResult, UploadError> {
        let kind = file.check()?;

        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(kind.mime())?;
        let form = multipart::Form::new().part(RESUME_FIELD, part);

        let response = self
            .http
            .post(format!("{}/api/upload-resume", self.base_url))
            .header(ADMIN_TOKEN_HEADER, token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, body));
        }

        let body: SuccessBody = response.json().await?;
        let url = body
            .url
            .filter(|u| !u.is_empty())
            .ok_or(UploadError::MissingUrl)?;
        debug!("Service published resume at {url}");

        Ok(UploadResult {
            url,
            message: body.message,
        })
    }

    /// GET /api/health
    pub async fn health(&self) -> Result<bool, UploadError> {
        #[derive(Deserialize)]
        struct Health {
            ok: bool,
        }

        let response = self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, body));
        }
        Ok(response.json::<Health>().await?.ok)
    }
}

/// The service's JSON error shape yields its `message`; anything else is
/// shown as raw text.
fn rejection(status: StatusCode, body: String) -> UploadError {
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => format!("Upload failed with status {status}"),
        Err(_) => body,
    };
    UploadError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn mib(bytes: &u64) -> u64 {
    bytes / (1024 * 1024)
}
