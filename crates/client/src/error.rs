use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSRF token not found")]
    CsrfTokenMissing,
    #[error("EV rejected the login (check shortcode, email and password)")]
    LoginRejected,
    #[error("timed out after {0:?} waiting for the online-banking import to finish")]
    ImportTimeout(Duration),
}
