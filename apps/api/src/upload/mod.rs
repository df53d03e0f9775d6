pub mod auth;
pub mod handlers;
pub mod policy;
pub mod service;

use serde::{Deserialize, Serialize};

/// Multipart field carrying the résumé file.
pub const RESUME_FIELD: &str = "resume";

/// Success body of `POST /api/upload-resume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub message: String,
}
