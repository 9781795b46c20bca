use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bank account id list: {0:?} (expected e.g. \"123,4567\")")]
    InvalidBankAccountIds(String),
    #[error("organizer {0:?} has no web-UI credentials configured")]
    MissingCredentials(String),
}

/// Per-organizer settings bag. Read-only at sync time; the host platform
/// owns the authoritative copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Host-platform organizer slug, used for job creation and log lines.
    pub organizer: String,
    #[serde(default)]
    pub import_enabled: bool,
    /// EV read-API key (secret).
    #[serde(default)]
    pub api_key: Option<String>,
    /// EV organization shortcode for the web-UI login.
    #[serde(default)]
    pub account_short: Option<String>,
    #[serde(default)]
    pub account_email: Option<String>,
    /// EV account password (secret). Requires banking permissions on the
    /// EV side to trigger an online-banking import.
    #[serde(default)]
    pub account_password: Option<String>,
    /// Comma-separated bank account ids to sync, e.g. "123,4567".
    #[serde(default)]
    pub bankaccount_ids: Option<String>,
}

/// The web-UI login triple for one EV account.
#[derive(Debug, Clone)]
pub struct EvCredentials {
    pub short: String,
    pub email: String,
    pub password: String,
}

impl OrganizerConfig {
    /// Assembles the web-UI credentials, failing if any part is missing.
    pub fn credentials(&self) -> Result<EvCredentials, ConfigError> {
        match (&self.account_short, &self.account_email, &self.account_password) {
            (Some(short), Some(email), Some(password)) => Ok(EvCredentials {
                short: short.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            _ => Err(ConfigError::MissingCredentials(self.organizer.clone())),
        }
    }

    /// Validated bank account id list, empty if unconfigured.
    pub fn bankaccount_id_list(&self) -> Result<Vec<String>, ConfigError> {
        match self.bankaccount_ids.as_deref() {
            Some(raw) => parse_bankaccount_ids(raw),
            None => Ok(vec![]),
        }
    }
}

fn re_id_list() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^[0-9]+(,[0-9]+)*$").expect("invalid regex"))
}

/// Validates and splits a comma-separated bank account id list.
pub fn parse_bankaccount_ids(raw: &str) -> Result<Vec<String>, ConfigError> {
    if !re_id_list().is_match(raw) {
        return Err(ConfigError::InvalidBankAccountIds(raw.to_string()));
    }
    Ok(raw.split(',').map(str::to_string).collect())
}
