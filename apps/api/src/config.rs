use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use tracing::warn;

const DEFAULT_REPO: &str = "Saurabhchhiller/saurabh-chhiller-portfolio-1";
const DEFAULT_TARGET_PATH: &str = "public/resume.pdf";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_COMMITTER_NAME: &str = "Portfolio Admin";
const DEFAULT_COMMITTER_EMAIL: &str = "noreply@example.com";

/// Application configuration loaded from environment variables.
///
/// The two secrets are optional: a server without them still starts (so the
/// health probe answers) but the upload endpoint refuses to work.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub upload_token: Option<String>,
    pub repo: RepoSlug,
    pub target_path: String,
    pub branch: String,
    pub github_api_url: String,
    pub committer: Committer,
    pub port: u16,
    pub rust_log: String,
}

/// Identity recorded as both committer and author of résumé commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// `owner/name` identifier of the repository hosting the static site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (owner, name) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| anyhow!("repository '{s}' must look like 'owner/name'"))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(anyhow!("repository '{s}' must look like 'owner/name'"));
        }
        Ok(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            github_token: optional_env("GITHUB_TOKEN"),
            upload_token: optional_env("UPLOAD_TOKEN"),
            repo: env_or("GITHUB_REPO", DEFAULT_REPO)
                .parse()
                .context("GITHUB_REPO is invalid")?,
            target_path: env_or("TARGET_PATH", DEFAULT_TARGET_PATH)
                .trim_matches('/')
                .to_string(),
            branch: env_or("GITHUB_BRANCH", DEFAULT_BRANCH),
            github_api_url: env_or("GITHUB_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            committer: Committer {
                name: env_or("COMMITTER_NAME", DEFAULT_COMMITTER_NAME),
                email: env_or("COMMITTER_EMAIL", DEFAULT_COMMITTER_EMAIL),
            },
            port: env_or("PORT", "4000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Logs a warning for every secret whose absence disables part of the
    /// upload flow.
    pub fn warn_if_incomplete(&self) {
        if self.github_token.is_none() {
            warn!("GITHUB_TOKEN is not set. The server will not be able to commit to GitHub.");
        }
        if self.upload_token.is_none() {
            warn!("UPLOAD_TOKEN is not set. Upload endpoint will be disabled until a token is configured.");
        }
    }

    /// Public URL of the target file under GitHub's raw-content convention.
    pub fn public_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.repo.owner, self.repo.name, self.branch, self.target_path
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Empty values count as unset so `UPLOAD_TOKEN=` in a `.env` disables the
/// feature instead of accepting an empty token.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(non_blank)
}

/// Surrounding whitespace is dropped, matching how the admin client trims
/// the token it sends.
fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        github_token: Some("ghp_test".to_string()),
        upload_token: Some("secret123".to_string()),
        repo: RepoSlug {
            owner: "octo".to_string(),
            name: "site".to_string(),
        },
        target_path: "public/resume.pdf".to_string(),
        branch: "main".to_string(),
        github_api_url: "http://127.0.0.1:9".to_string(),
        committer: Committer {
            name: DEFAULT_COMMITTER_NAME.to_string(),
            email: DEFAULT_COMMITTER_EMAIL.to_string(),
        },
        port: 4000,
        rust_log: "info".to_string(),
    }
}
