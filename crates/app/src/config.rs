use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use evsync_client::{PollConfig, DEFAULT_API_BASE, DEFAULT_WEB_BASE};
use evsync_core::OrganizerConfig;
use evsync_sync::{source::DEFAULT_DAYS_BACK, EvStatementSource};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub host: HostConfig,
    #[serde(default)]
    pub ev: EvConfig,
    #[serde(default)]
    pub organizers: Vec<OrganizerConfig>,
}

/// Where the host platform's bank-transfer API lives.
#[derive(Debug, Deserialize)]
pub struct HostConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EvConfig {
    pub web_base: String,
    pub api_base: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub days_back: u32,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            web_base: DEFAULT_WEB_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval_secs: 5,
            poll_timeout_secs: 15 * 60,
            days_back: DEFAULT_DAYS_BACK,
        }
    }
}

impl EvConfig {
    pub fn source(&self) -> EvStatementSource {
        EvStatementSource {
            web_base: self.web_base.clone(),
            api_base: self.api_base.clone(),
            poll: PollConfig {
                interval: Duration::from_secs(self.poll_interval_secs),
                timeout: Duration::from_secs(self.poll_timeout_secs),
            },
            days_back: self.days_back,
        }
    }
}

pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
        [host]
        base_url = "https://tickets.example.org/api"
        token = "host-secret"

        [ev]
        poll_timeout_secs = 120

        [[organizers]]
        organizer = "demo"
        import_enabled = true
        api_key = "ev-secret"
        account_short = "club"
        account_email = "treasurer@example.org"
        account_password = "hunter2"
        bankaccount_ids = "123,4567"
    "#;

    #[test]
    fn loads_sample_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.host.base_url, "https://tickets.example.org/api");
        assert_eq!(cfg.ev.poll_timeout_secs, 120);
        // Unset EV fields fall back to defaults.
        assert_eq!(cfg.ev.web_base, DEFAULT_WEB_BASE);
        assert_eq!(cfg.ev.days_back, DEFAULT_DAYS_BACK);
        assert_eq!(cfg.organizers.len(), 1);
        assert!(cfg.organizers[0].import_enabled);
    }

    #[test]
    fn organizers_default_to_empty() {
        let cfg: AppConfig =
            toml::from_str("[host]\nbase_url = \"https://tickets.example.org\"").unwrap();
        assert!(cfg.organizers.is_empty());
        assert!(cfg.host.token.is_none());
    }
}
