//! Where statements come from: EV in production, a double in tests.

use async_trait::async_trait;

use evsync_client::{EvApi, EvSession, PollConfig, DEFAULT_API_BASE, DEFAULT_WEB_BASE};
use evsync_core::{BankStatementRow, OrganizerConfig};
use evsync_import::normalize_statement;

use crate::error::SyncError;

/// How many trailing days of bookings a sweep pulls. Sweeps run at least
/// every 6 hours, so 8 days leaves ample overlap for late bookings.
pub const DEFAULT_DAYS_BACK: u32 = 8;

#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Produces a fresh normalized statement for this organizer's EV
    /// account: trigger EV's own bank import, wait for it, then read the
    /// trailing booking window.
    async fn fetch_statement(
        &self,
        cfg: &OrganizerConfig,
        api_key: &str,
    ) -> Result<Vec<BankStatementRow>, SyncError>;
}

pub struct EvStatementSource {
    pub web_base: String,
    pub api_base: String,
    pub poll: PollConfig,
    pub days_back: u32,
}

impl Default for EvStatementSource {
    fn default() -> Self {
        Self {
            web_base: DEFAULT_WEB_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            poll: PollConfig::default(),
            days_back: DEFAULT_DAYS_BACK,
        }
    }
}

#[async_trait]
impl StatementSource for EvStatementSource {
    async fn fetch_statement(
        &self,
        cfg: &OrganizerConfig,
        api_key: &str,
    ) -> Result<Vec<BankStatementRow>, SyncError> {
        let creds = cfg.credentials()?;
        let ids = cfg.bankaccount_id_list()?;

        let mut session =
            EvSession::login(&self.web_base, &creds.short, &creds.email, &creds.password).await?;
        tracing::info!(organizer = %cfg.organizer, "triggering EV online-banking import");
        session.trigger_import(&ids, self.poll).await?;

        tracing::info!(organizer = %cfg.organizer, "fetching bank statement from EV");
        let api = EvApi::new(&self.api_base, api_key);
        let bookings = api.fetch_bookings(Some(self.days_back)).await?;
        Ok(normalize_statement(bookings))
    }
}
