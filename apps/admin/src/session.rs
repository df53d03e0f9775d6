//! Admin sign-in state.
//!
//! Signing in only records the upload token the admin typed. Nothing is
//! verified here: the service checks the token on every upload, and a wrong
//! token shows up as an `Unauthorized` upload error.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSession {
    token: Option<String>,
}

impl AdminSession {
    /// Starts a session with `token`. Blank input leaves the session signed
    /// out and returns `false`.
    pub fn sign_in(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            return false;
        }
        self.token = Some(token.to_string());
        true
    }

    pub fn sign_out(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
