//! Wire types for the GitHub contents API.

use serde::{Deserialize, Serialize};

use crate::config::Committer;

/// `GET /contents/{path}` answers with an object for a file and an array for
/// a directory.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentResponse {
    File(ContentEntry),
    Directory(Vec<serde_json::Value>),
}

#[derive(Debug, Deserialize)]
pub struct ContentEntry {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct PutRequest<'a> {
    pub message: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
    pub branch: &'a str,
    pub committer: Identity<'a>,
    pub author: Identity<'a>,
}

#[derive(Debug, Serialize)]
pub struct Identity<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a Committer> for Identity<'a> {
    fn from(c: &'a Committer) -> Self {
        Identity {
            name: &c.name,
            email: &c.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PutResponse {
    #[serde(default)]
    pub commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
