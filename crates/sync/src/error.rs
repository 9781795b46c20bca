use thiserror::Error;

use evsync_client::ClientError;
use evsync_core::ConfigError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("host platform call failed: {0}")]
    Host(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Host(err.to_string())
    }
}
