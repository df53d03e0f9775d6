//! Admin side of the résumé publishing flow: pick a file, check it against
//! the upload policy, send it to the Folio API and keep the displayed résumé
//! link in sync.

pub mod candidate;
pub mod client;
pub mod panel;
pub mod preferences;
pub mod session;
