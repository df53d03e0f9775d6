//! The admin panel: owns the displayed résumé link and drives one upload
//! attempt at a time through `Idle → Uploading → Success | Error`.
//!
//! Success and error banners are transient. They fall back to `Idle` once
//! `STATUS_CLEAR_DELAY` has passed, observed through `tick`.

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use crate::candidate::CandidateFile;
use crate::client::{ErrorKind, UploadClient};
use crate::preferences::{Preferences, PreferencesStore};
use crate::session::AdminSession;

/// Résumé shown when no custom upload has been recorded.
pub const DEFAULT_RESUME_URL: &str = "/resume.html";
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(3);

const UPDATED_MESSAGE: &str = "Resume updated successfully! Changes are live.";
const RESET_MESSAGE: &str = "Reset to default resume.";
const SIGN_IN_FIRST: &str = "Sign in with the upload token first.";

/// The résumé the portfolio links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeLink {
    pub url: String,
    pub name: Option<String>,
}

impl Default for ResumeLink {
    fn default() -> Self {
        Self {
            url: DEFAULT_RESUME_URL.to_string(),
            name: None,
        }
    }
}

impl ResumeLink {
    fn from_prefs(prefs: &Preferences) -> Self {
        match &prefs.resume_url {
            Some(url) => Self {
                url: url.clone(),
                name: prefs.resume_name.clone(),
            },
            None => Self::default(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.url == DEFAULT_RESUME_URL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success(String),
    Error { kind: ErrorKind, message: String },
}

pub struct AdminPanel {
    client: UploadClient,
    store: PreferencesStore,
    prefs: Preferences,
    session: AdminSession,
    resume: ResumeLink,
    candidate: Option<CandidateFile>,
    status: UploadStatus,
    clear_at: Option<Instant>,
}

impl AdminPanel {
    /// Opens the panel with the résumé link and remembered token from the
    /// preferences cache.
    pub fn open(client: UploadClient, store: PreferencesStore) -> Result<Self> {
        let prefs = store.load()?;
        let mut session = AdminSession::default();
        if let Some(token) = prefs.upload_token.as_deref() {
            session.sign_in(token);
        }

        Ok(Self {
            client,
            resume: ResumeLink::from_prefs(&prefs),
            store,
            prefs,
            session,
            candidate: None,
            status: UploadStatus::Idle,
            clear_at: None,
        })
    }

    pub fn client(&self) -> &UploadClient {
        &self.client
    }

    pub fn resume(&self) -> &ResumeLink {
        &self.resume
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut AdminSession {
        &mut self.session
    }

    pub fn candidate(&self) -> Option<&CandidateFile> {
        self.candidate.as_ref()
    }

    /// Stores the candidate and clears any banner left by a previous attempt.
    pub fn select_file(&mut self, file: CandidateFile) {
        self.candidate = Some(file);
        self.status = UploadStatus::Idle;
        self.clear_at = None;
    }

    /// Persists the current session token so the next `open` signs in.
    pub fn remember_token(&mut self) -> Result<()> {
        self.prefs.upload_token = self.session.token().map(String::from);
        self.store.save(&self.prefs)
    }

    /// Uploads the selected file. Does nothing without a candidate.
    ///
    /// The displayed résumé only changes when the service answered with a
    /// URL; every failure leaves it as it was.
    pub async fn upload(&mut self) -> &UploadStatus {
        let Some(file) = self.candidate.clone() else {
            return &self.status;
        };
        let Some(token) = self.session.token().map(String::from) else {
            self.finish(UploadStatus::Error {
                kind: ErrorKind::Unauthorized,
                message: SIGN_IN_FIRST.to_string(),
            });
            return &self.status;
        };

        self.status = UploadStatus::Uploading;
        self.clear_at = None;

        match self.client.upload(&file, &token).await {
            Ok(result) => {
                info!("Resume {} published at {}", file.file_name, result.url);
                self.set_resume(ResumeLink {
                    url: result.url,
                    name: Some(file.file_name.clone()),
                });
                let message = result.message.unwrap_or_else(|| UPDATED_MESSAGE.to_string());
                self.finish(UploadStatus::Success(message));
            }
            Err(e) => {
                warn!("Upload of {} failed: {e}", file.file_name);
                self.finish(UploadStatus::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
        &self.status
    }

    /// Drops the custom résumé and goes back to the default link.
    pub fn reset_to_default(&mut self) {
        self.set_resume(ResumeLink::default());
        self.finish(UploadStatus::Success(RESET_MESSAGE.to_string()));
    }

    /// Clears a finished banner once its delay has elapsed.
    ///
    /// The panel keeps no timer of its own. A long-lived front end has to
    /// call this from its event loop; the one-shot CLI exits before the
    /// delay and never does.
    pub fn tick(&mut self, now: Instant) {
        if self.clear_at.is_some_and(|at| now >= at) {
            self.status = UploadStatus::Idle;
            self.clear_at = None;
        }
    }

    fn finish(&mut self, status: UploadStatus) {
        self.status = status;
        self.clear_at = Some(Instant::now() + STATUS_CLEAR_DELAY);
    }

    /// Updates the link and mirrors it to the preferences cache. A failed
    /// save is logged; the in-memory link stays authoritative.
    fn set_resume(&mut self, link: ResumeLink) {
        if link.is_default() {
            self.prefs.resume_url = None;
            self.prefs.resume_name = None;
        } else {
            self.prefs.resume_url = Some(link.url.clone());
            self.prefs.resume_name = link.name.clone();
        }
        self.resume = link;
        if let Err(e) = self.store.save(&self.prefs) {
            warn!("Could not save preferences to {}: {e:#}", self.store.path().display());
        }
    }
}
