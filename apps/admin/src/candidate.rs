use std::path::Path;

use bytes::Bytes;
use folio_api::upload::policy::{check_upload, PolicyViolation, ResumeKind};

use crate::client::UploadError;

/// A file the admin picked for upload, held in memory until the attempt
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl CandidateFile {
    pub fn new(
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Applies the same policy the service enforces.
    pub fn check(&self) -> Result<ResumeKind, PolicyViolation> {
        check_upload(&self.mime, self.size_bytes())
    }
}
