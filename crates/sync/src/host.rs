//! The host platform's bank-transfer boundary.
//!
//! Reconciliation of rows against orders happens entirely on the host side;
//! this module only creates import jobs and hands rows over. The trait keeps
//! the sweep testable with an in-memory double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use evsync_core::BankStatementRow;

use crate::error::SyncError;

pub type JobId = i64;

#[async_trait]
pub trait BankImportSink: Send + Sync {
    /// Creation timestamp of the most recent bank-import job, if any.
    async fn latest_job_created(&self) -> Result<Option<DateTime<Utc>>, SyncError>;

    /// Creates a new bank-import job for the organizer in the given currency.
    async fn create_job(&self, organizer: &str, currency: &str) -> Result<JobId, SyncError>;

    /// Hands rows to the host's asynchronous transaction processing. Returns
    /// once the hand-off is accepted; reconciliation itself is not awaited.
    async fn submit_rows(&self, job: JobId, rows: &[BankStatementRow]) -> Result<(), SyncError>;
}

/// Sink talking to the host platform's HTTP API.
pub struct HttpHostSink {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobRecord {
    id: JobId,
    created: DateTime<Utc>,
}

impl HttpHostSink {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl BankImportSink for HttpHostSink {
    async fn latest_job_created(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
        let url = format!("{}/banktransfer/jobs/latest", self.base_url);
        let resp = self.request(self.http.get(&url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let job: JobRecord = resp.error_for_status()?.json().await?;
        Ok(Some(job.created))
    }

    async fn create_job(&self, organizer: &str, currency: &str) -> Result<JobId, SyncError> {
        let url = format!("{}/banktransfer/jobs", self.base_url);
        let job: JobRecord = self
            .request(self.http.post(&url))
            .json(&serde_json::json!({ "organizer": organizer, "currency": currency }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(job.id)
    }

    async fn submit_rows(&self, job: JobId, rows: &[BankStatementRow]) -> Result<(), SyncError> {
        let url = format!("{}/banktransfer/jobs/{job}/transactions", self.base_url);
        self.request(self.http.post(&url))
            .json(rows)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
