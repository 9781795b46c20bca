//! One pass over every configured organizer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use evsync_core::{BankStatementRow, OrganizerConfig};

use crate::error::SyncError;
use crate::guard;
use crate::host::{BankImportSink, JobId};
use crate::source::StatementSource;

/// Host-platform orders are Euro-denominated; so are EV bookings.
const CURRENCY: &str = "EUR";

#[derive(Debug, Default)]
pub struct SweepReport {
    /// Organizers whose rows were handed to the host, with the job created.
    pub imported: Vec<(String, JobId)>,
    /// Enabled organizers skipped for lack of an API key.
    pub skipped: Vec<String>,
    /// Organizers whose credential or hand-off failed this run.
    pub failed: Vec<String>,
}

/// Consults the 6-hour guard against the host's latest import job and runs
/// a sweep only when due. Returns `None` when the guard said no.
pub async fn run_if_due(
    organizers: &[OrganizerConfig],
    source: &dyn StatementSource,
    sink: &dyn BankImportSink,
    now: DateTime<Utc>,
) -> Result<Option<SweepReport>, SyncError> {
    let last = sink.latest_job_created().await?;
    if !guard::due(last, now) {
        tracing::debug!("latest bank-import job is recent, nothing to do");
        return Ok(None);
    }
    Ok(Some(run_sweep(organizers, source, sink).await))
}

/// Imports statements for every enabled organizer.
///
/// Statements are cached per API key for the duration of this call, so
/// organizers sharing EV credentials trigger EV's bank import only once.
/// A failure aborts that organizer only; the sweep carries on. Failures are
/// not cached, so a later organizer with the same key gets a fresh attempt.
pub async fn run_sweep(
    organizers: &[OrganizerConfig],
    source: &dyn StatementSource,
    sink: &dyn BankImportSink,
) -> SweepReport {
    let mut cache: HashMap<String, Vec<BankStatementRow>> = HashMap::new();
    let mut report = SweepReport::default();

    for org in organizers {
        if !org.import_enabled {
            continue;
        }
        let Some(api_key) = org.api_key.as_deref() else {
            tracing::warn!(
                organizer = %org.organizer,
                "bank-statement import enabled but no EV API key configured, skipping"
            );
            report.skipped.push(org.organizer.clone());
            continue;
        };

        tracing::info!(organizer = %org.organizer, "bank import from EV");
        let rows = match cache.get(api_key) {
            Some(rows) => rows.clone(),
            None => match source.fetch_statement(org, api_key).await {
                Ok(rows) => {
                    cache.insert(api_key.to_string(), rows.clone());
                    rows
                }
                Err(err) => {
                    tracing::error!(organizer = %org.organizer, error = %err, "EV import failed");
                    report.failed.push(org.organizer.clone());
                    continue;
                }
            },
        };

        match hand_off(sink, org, &rows).await {
            Ok(job) => {
                tracing::info!(
                    organizer = %org.organizer,
                    job,
                    rows = rows.len(),
                    "bank import finished"
                );
                report.imported.push((org.organizer.clone(), job));
            }
            Err(err) => {
                tracing::error!(organizer = %org.organizer, error = %err, "hand-off to host failed");
                report.failed.push(org.organizer.clone());
            }
        }
    }

    report
}

async fn hand_off(
    sink: &dyn BankImportSink,
    org: &OrganizerConfig,
    rows: &[BankStatementRow],
) -> Result<JobId, SyncError> {
    let job = sink.create_job(&org.organizer, CURRENCY).await?;
    sink.submit_rows(job, rows).await?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn org(name: &str, api_key: Option<&str>) -> OrganizerConfig {
        OrganizerConfig {
            organizer: name.to_string(),
            import_enabled: true,
            api_key: api_key.map(str::to_string),
            account_short: Some("club".to_string()),
            account_email: Some("treasurer@example.org".to_string()),
            account_password: Some("hunter2".to_string()),
            bankaccount_ids: Some("123".to_string()),
        }
    }

    fn row(reference: &str) -> BankStatementRow {
        BankStatementRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount: "10.00".to_string(),
            reference: reference.to_string(),
            payer: None,
            iban: None,
            bic: None,
        }
    }

    /// Source double that counts fetches per API key and can be told to
    /// fail for specific keys.
    #[derive(Default)]
    struct FakeSource {
        fetches: Mutex<Vec<String>>,
        failing_keys: Vec<String>,
    }

    #[async_trait]
    impl StatementSource for FakeSource {
        async fn fetch_statement(
            &self,
            _cfg: &OrganizerConfig,
            api_key: &str,
        ) -> Result<Vec<BankStatementRow>, SyncError> {
            self.fetches.lock().unwrap().push(api_key.to_string());
            if self.failing_keys.iter().any(|k| k == api_key) {
                return Err(SyncError::Host("EV unreachable".to_string()));
            }
            Ok(vec![row(api_key)])
        }
    }

    #[derive(Default)]
    struct FakeSink {
        latest: Option<DateTime<Utc>>,
        jobs: Mutex<Vec<(String, String)>>,
        submissions: Mutex<Vec<(JobId, usize)>>,
    }

    #[async_trait]
    impl BankImportSink for FakeSink {
        async fn latest_job_created(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
            Ok(self.latest)
        }

        async fn create_job(&self, organizer: &str, currency: &str) -> Result<JobId, SyncError> {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push((organizer.to_string(), currency.to_string()));
            Ok(jobs.len() as JobId)
        }

        async fn submit_rows(
            &self,
            job: JobId,
            rows: &[BankStatementRow],
        ) -> Result<(), SyncError> {
            self.submissions.lock().unwrap().push((job, rows.len()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn shared_api_key_fetches_once_but_creates_two_jobs() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let orgs = vec![org("alpha", Some("key-1")), org("beta", Some("key-1"))];

        let report = run_sweep(&orgs, &source, &sink).await;

        assert_eq!(source.fetches.lock().unwrap().len(), 1);
        assert_eq!(report.imported.len(), 2);
        assert_eq!(sink.jobs.lock().unwrap().len(), 2);
        assert_eq!(sink.submissions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_api_key_is_skipped_with_sweep_continuing() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let orgs = vec![org("alpha", None), org("beta", Some("key-1"))];

        let report = run_sweep(&orgs, &source, &sink).await;

        assert_eq!(report.skipped, vec!["alpha"]);
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.imported[0].0, "beta");
    }

    #[tokio::test]
    async fn disabled_organizer_is_ignored_entirely() {
        let source = FakeSource::default();
        let sink = FakeSink::default();
        let mut disabled = org("alpha", Some("key-1"));
        disabled.import_enabled = false;

        let report = run_sweep(&[disabled], &source, &sink).await;

        assert!(source.fetches.lock().unwrap().is_empty());
        assert!(report.imported.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn failure_aborts_one_credential_but_not_the_sweep() {
        let source = FakeSource {
            failing_keys: vec!["bad-key".to_string()],
            ..Default::default()
        };
        let sink = FakeSink::default();
        let orgs = vec![org("alpha", Some("bad-key")), org("beta", Some("key-1"))];

        let report = run_sweep(&orgs, &source, &sink).await;

        assert_eq!(report.failed, vec!["alpha"]);
        assert_eq!(report.imported.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached_across_organizers() {
        let source = FakeSource {
            failing_keys: vec!["bad-key".to_string()],
            ..Default::default()
        };
        let sink = FakeSink::default();
        let orgs = vec![org("alpha", Some("bad-key")), org("beta", Some("bad-key"))];

        let report = run_sweep(&orgs, &source, &sink).await;

        // No circuit breaker: the second organizer retries the same key.
        assert_eq!(source.fetches.lock().unwrap().len(), 2);
        assert_eq!(report.failed, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn jobs_are_created_in_euro() {
        let source = FakeSource::default();
        let sink = FakeSink::default();

        run_sweep(&[org("alpha", Some("key-1"))], &source, &sink).await;

        assert_eq!(sink.jobs.lock().unwrap()[0].1, "EUR");
    }

    #[tokio::test]
    async fn recent_job_suppresses_the_sweep() {
        let now = Utc::now();
        let source = FakeSource::default();
        let sink = FakeSink {
            latest: Some(now - Duration::hours(5)),
            ..Default::default()
        };

        let outcome = run_if_due(&[org("alpha", Some("key-1"))], &source, &sink, now)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(source.fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_job_lets_the_sweep_run() {
        let now = Utc::now();
        let source = FakeSource::default();
        let sink = FakeSink {
            latest: Some(now - Duration::hours(7)),
            ..Default::default()
        };

        let outcome = run_if_due(&[org("alpha", Some("key-1"))], &source, &sink, now)
            .await
            .unwrap();

        assert_eq!(outcome.unwrap().imported.len(), 1);
    }
}
