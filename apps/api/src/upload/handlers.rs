//! Axum route handler for the résumé upload endpoint.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::auth::authorize;
use crate::upload::policy::{check_upload, ResumeKind, MAX_UPLOAD_BYTES};
use crate::upload::service::{publish_resume, ResumeUpload};
use crate::upload::{UploadResponse, RESUME_FIELD};

/// POST /api/upload-resume
///
/// The token is checked before any of the body is read. A request that is
/// not multipart at all is treated as carrying no file.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let expected = state
        .config
        .upload_token
        .as_deref()
        .ok_or(AppError::Misconfigured(
            "Upload feature disabled on server (no UPLOAD_TOKEN configured).",
        ))?;

    if let Err(e) = authorize(&headers, expected) {
        warn!("Rejected upload with invalid or missing token");
        return Err(e);
    }

    let multipart = multipart.map_err(|rejection| {
        debug!("Upload body is not multipart: {rejection}");
        AppError::MissingFile
    })?;
    let upload = read_resume_field(multipart)
        .await?
        .ok_or(AppError::MissingFile)?;

    let store = state
        .store
        .as_ref()
        .ok_or(AppError::Misconfigured("Server not configured with GITHUB_TOKEN"))?;

    let response = publish_resume(store.as_ref(), &state.config, &upload, Utc::now()).await?;
    Ok(Json(response))
}

/// Returns the first `resume` field, validated against the upload policy.
/// Other fields are skipped.
async fn read_resume_field(mut multipart: Multipart) -> Result<Option<ResumeUpload>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("resume").to_string();
        // Browsers occasionally omit the part's content type; fall back to
        // the file extension.
        let mime = match field.content_type() {
            Some(ct) => ct.to_string(),
            None => ResumeKind::from_file_name(&file_name)
                .map(|k| k.mime().to_string())
                .unwrap_or_default(),
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        let kind = check_upload(&mime, bytes.len() as u64)?;

        return Ok(Some(ResumeUpload {
            file_name,
            kind,
            bytes,
        }));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge {
            limit: MAX_UPLOAD_BYTES,
        }
    } else {
        AppError::BadMultipart(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use crate::config::{test_config, Config};
    use crate::errors::ErrorBody;
    use crate::github::{Committed, ContentStore, PutFile, RemoteFile, RepoError};
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::upload::policy::MAX_UPLOAD_BYTES;
    use crate::upload::UploadResponse;

    use super::*;

    #[derive(Default)]
    struct MockStore {
        existing_sha: Option<String>,
        conflict: bool,
        reads: AtomicUsize,
        writes: Mutex<Vec<PutFile>>,
    }

    impl MockStore {
        fn calls(&self) -> usize {
            self.reads.load(Ordering::SeqCst) + self.writes.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentStore for MockStore {
        async fn get_file(&self, _path: &str) -> Result<Option<RemoteFile>, RepoError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.existing_sha.clone().map(|sha| RemoteFile { sha: Some(sha) }))
        }

        async fn put_file(&self, file: PutFile) -> Result<Committed, RepoError> {
            self.writes.lock().unwrap().push(file);
            if self.conflict {
                return Err(RepoError::Conflict {
                    message: "public/resume.pdf does not match abc123".to_string(),
                });
            }
            Ok(Committed::default())
        }
    }

    const BOUNDARY: &str = "folio-test-boundary";

    fn multipart_body(field: &str, file_name: &str, mime: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/upload-resume")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header("x-admin-token", token);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn pdf_body() -> Vec<u8> {
        multipart_body("resume", "resume.pdf", "application/pdf", b"%PDF-1.7 test")
    }

    async fn send(
        config: Config,
        store: Option<Arc<MockStore>>,
        request: Request<Body>,
    ) -> (StatusCode, Vec<u8>) {
        let state = AppState {
            config: Arc::new(config),
            store: store.map(|s| s as Arc<dyn ContentStore>),
        };
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    fn error_body(bytes: &[u8]) -> ErrorBody {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_creates_file_and_returns_raw_url() {
        let store = Arc::new(MockStore::default());
        let (status, body) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: UploadResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            response.url,
            "https://raw.githubusercontent.com/octo/site/main/public/resume.pdf"
        );
        assert_eq!(
            response.message,
            "Resume uploaded and published to repository."
        );
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].sha.is_none());
    }

    #[tokio::test]
    async fn test_upload_updates_existing_file_with_read_sha() {
        let store = Arc::new(MockStore {
            existing_sha: Some("abc123".to_string()),
            ..Default::default()
        });
        let (status, _) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            store.writes.lock().unwrap()[0].sha.as_deref(),
            Some("abc123")
        );
    }

    #[tokio::test]
    async fn test_bearer_authorization_header_is_accepted() {
        let store = Arc::new(MockStore::default());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload-resume")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("authorization", "Bearer secret123")
            .body(Body::from(pdf_body()))
            .unwrap();

        let (status, _) = send(test_config(), Some(store), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_token_is_rejected_without_repository_io() {
        let store = Arc::new(MockStore::default());
        let (status, body) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("wrong"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(&body).message, "Invalid or missing upload token");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected_without_repository_io() {
        let store = Arc::new(MockStore::default());
        let (status, _) = send(
            test_config(),
            Some(store.clone()),
            upload_request(None, pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_secret_disables_uploads() {
        let config = Config {
            upload_token: None,
            ..test_config()
        };
        let store = Arc::new(MockStore::default());
        let (status, body) = send(
            config,
            Some(store.clone()),
            upload_request(Some("secret123"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_body(&body).message.contains("no UPLOAD_TOKEN configured"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let store = Arc::new(MockStore::default());
        let body = multipart_body("other", "notes.pdf", "application/pdf", b"x");
        let (status, body) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_body(&body).message, "No file uploaded");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_treated_as_missing_file() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/upload-resume")
            .header("content-type", "application/json")
            .header("x-admin-token", "secret123")
            .body(Body::from("{}"))
            .unwrap();

        let (status, body) = send(test_config(), None, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_body(&body).message, "No file uploaded");
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected_before_repository_io() {
        let store = Arc::new(MockStore::default());
        let body = multipart_body("resume", "photo.png", "image/png", b"\x89PNG");
        let (status, body) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), body),
        )
        .await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_body(&body).message, "Unsupported file type");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_before_repository_io() {
        let store = Arc::new(MockStore::default());
        let data = vec![b'a'; MAX_UPLOAD_BYTES as usize + 1];
        let body = multipart_body("resume", "resume.pdf", "application/pdf", &data);
        let (status, _) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), body),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_body_over_route_limit_is_payload_too_large() {
        let store = Arc::new(MockStore::default());
        let data = vec![b'a'; 11 * 1024 * 1024];
        let body = multipart_body("resume", "resume.pdf", "application/pdf", &data);
        let (status, body) = send(
            test_config(),
            Some(store.clone()),
            upload_request(Some("secret123"), body),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            error_body(&body).message,
            "File is too large. Please upload a file smaller than 10MB."
        );
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_github_token_is_misconfiguration() {
        let (status, body) = send(
            test_config(),
            None,
            upload_request(Some("secret123"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error_body(&body).message,
            "Server not configured with GITHUB_TOKEN"
        );
    }

    #[tokio::test]
    async fn test_stale_sha_is_reported_as_conflict() {
        let store = Arc::new(MockStore {
            existing_sha: Some("abc123".to_string()),
            conflict: true,
            ..Default::default()
        });
        let (status, body) = send(
            test_config(),
            Some(store),
            upload_request(Some("secret123"), pdf_body()),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        let body = error_body(&body);
        assert!(body.message.contains("retry"));
        assert!(body.detail.unwrap().contains("does not match"));
    }
}
