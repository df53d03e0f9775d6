//! Which résumé files may be published. Shared by the service and the admin
//! client so both sides reject the same uploads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on a résumé file, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeKind {
    Pdf,
    Doc,
    Docx,
}

impl ResumeKind {
    pub const ALL: [ResumeKind; 3] = [ResumeKind::Pdf, ResumeKind::Doc, ResumeKind::Docx];

    pub fn mime(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "application/pdf",
            ResumeKind::Doc => "application/msword",
            ResumeKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "pdf",
            ResumeKind::Doc => "doc",
            ResumeKind::Docx => "docx",
        }
    }

    /// Matches the essence of a MIME type; parameters such as `; charset=`
    /// and letter case are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|k| k.mime().eq_ignore_ascii_case(essence))
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::ALL
            .into_iter()
            .find(|k| k.extension().eq_ignore_ascii_case(ext))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("file is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("unsupported file type '{0}'")]
    UnsupportedType(String),
}

/// Validates a candidate upload and returns its kind.
pub fn check_upload(mime: &str, size: u64) -> Result<ResumeKind, PolicyViolation> {
    let kind = ResumeKind::from_mime(mime)
        .ok_or_else(|| PolicyViolation::UnsupportedType(mime.to_string()))?;
    if size > MAX_UPLOAD_BYTES {
        return Err(PolicyViolation::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(kind)
}
