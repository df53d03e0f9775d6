use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::errors::AppError;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Pulls the upload token from `x-admin-token`, falling back to
/// `Authorization`. A leading `Bearer ` is stripped from either.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers
        .get(ADMIN_TOKEN_HEADER)
        .or_else(|| headers.get(AUTHORIZATION))?
        .to_str()
        .ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    (!token.is_empty()).then_some(token)
}

/// Checks the request's token against the configured shared secret.
pub fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    match extract_token(headers) {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
