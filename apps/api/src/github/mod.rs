/// GitHub contents client: the only place the service talks to the remote
/// repository hosting the static site.
///
/// Writes are optimistic: a blob that already exists can only be replaced by
/// a request carrying its current `sha`. A stale `sha` comes back as
/// `RepoError::Conflict`.
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::{Committer, RepoSlug};

pub mod models;

use models::{ApiErrorBody, ContentResponse, PutRequest, PutResponse};

const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("folio-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The supplied revision marker no longer matches the stored blob.
    #[error("stale revision marker: {message}")]
    Conflict { message: String },

    #[error("Failed to parse GitHub response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Current state of a file in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Blob sha; `None` when the path resolved to something that cannot be
    /// overwritten in place (a directory listing).
    pub sha: Option<String>,
}

/// A create-or-update request for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFile {
    pub path: String,
    pub content_base64: String,
    /// Must be the current blob sha when the file exists; `None` creates it.
    pub sha: Option<String>,
    pub message: String,
    pub committer: Committer,
}

/// What GitHub reports back after a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Committed {
    pub commit_sha: Option<String>,
}

/// Read/write access to file blobs in a remote repository.
///
/// Carried in `AppState` as `Arc<dyn ContentStore>` so handlers can be
/// exercised without a network.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns `Ok(None)` when nothing exists at `path`.
    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, RepoError>;

    async fn put_file(&self, file: PutFile) -> Result<Committed, RepoError>;
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    repo: RepoSlug,
    branch: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: String, repo: RepoSlug, branch: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            repo,
            branch,
        }
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every path segment
    /// percent-encoded.
    fn contents_url(&self, path: &str) -> Result<Url, RepoError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| RepoError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RepoError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", GITHUB_API_VERSION)
            .header("user-agent", USER_AGENT)
    }
}

#[async_trait]
impl ContentStore for GitHubClient {
    async fn get_file(&self, path: &str) -> Result<Option<RemoteFile>, RepoError> {
        let url = self.contents_url(path)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{path} does not exist yet in {}", self.repo);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        let sha = match decode::<ContentResponse>(response).await? {
            ContentResponse::File(entry) => Some(entry.sha),
            ContentResponse::Directory(_) => None,
        };
        Ok(Some(RemoteFile { sha }))
    }

    async fn put_file(&self, file: PutFile) -> Result<Committed, RepoError> {
        let url = self.contents_url(&file.path)?;
        let body = PutRequest {
            message: &file.message,
            content: &file.content_base64,
            sha: file.sha.as_deref(),
            branch: &self.branch,
            committer: (&file.committer).into(),
            author: (&file.committer).into(),
        };

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        let put: PutResponse = decode(response).await?;
        Ok(Committed {
            commit_sha: put.commit.map(|c| c.sha),
        })
    }
}

/// Reads the body and parses it separately, so a body GitHub sent but we
/// cannot understand is a `Parse` error rather than a transport failure.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RepoError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Maps a non-2xx GitHub response. 409 always means the sha was stale; a 422
/// mentioning `sha` is what GitHub sends when an existing file is written
/// without one.
fn api_error(status: StatusCode, body: String) -> RepoError {
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    let stale = status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && message.contains("sha"));
    if stale {
        RepoError::Conflict { message }
    } else {
        RepoError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
