//! Folio upload service: publishes the portfolio résumé to the GitHub
//! repository that hosts the static site.

pub mod config;
pub mod errors;
pub mod github;
pub mod routes;
pub mod state;
pub mod upload;
