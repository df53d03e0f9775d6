use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::github::{ContentStore, PutFile};
use crate::upload::policy::ResumeKind;
use crate::upload::UploadResponse;

pub const PUBLISHED_MESSAGE: &str = "Resume uploaded and published to repository.";

/// A validated résumé file taken from the request body.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub kind: ResumeKind,
    pub bytes: Bytes,
}

/// Publishes `upload` at the configured target path.
///
/// Reads the current blob sha immediately before writing so the write
/// carries the freshest marker available. The read and the write are not
/// atomic; a concurrent writer surfaces as `AppError::Conflict`.
pub async fn publish_resume(
    store: &dyn ContentStore,
    config: &Config,
    upload: &ResumeUpload,
    now: DateTime<Utc>,
) -> Result<UploadResponse, AppError> {
    let path = config.target_path.as_str();

    let sha = store.get_file(path).await?.and_then(|f| f.sha);
    let action = if sha.is_some() { "update" } else { "create" };

    let committed = store
        .put_file(PutFile {
            path: path.to_string(),
            content_base64: STANDARD.encode(&upload.bytes),
            sha,
            message: commit_message(now),
            committer: config.committer.clone(),
        })
        .await?;

    info!(
        "Published {} ({:?}, {} bytes) to {}:{} [{action}, commit {}]",
        upload.file_name,
        upload.kind,
        upload.bytes.len(),
        config.repo,
        path,
        committed.commit_sha.as_deref().unwrap_or("unknown"),
    );

    Ok(UploadResponse {
        url: config.public_url(),
        message: PUBLISHED_MESSAGE.to_string(),
    })
}

pub fn commit_message(now: DateTime<Utc>) -> String {
    format!(
        "Update resume: {}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
