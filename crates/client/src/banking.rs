//! Trigger EV's server-side online-banking import and wait for it.
//!
//! The import is an asynchronous job on EV's side. Triggering it returns
//! immediately; completion is observed by polling the task-list endpoint
//! until no import-mode task is still in progress.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer};

use crate::error::ClientError;
use crate::session::EvSession;

/// The task mode EV assigns to online-banking import runs. Tasks with any
/// other mode belong to unrelated EV features and are never touched.
const IMPORT_MODE: &str = "ONLINEBANKING_IMPORT";

const STATE_PROGRESS: &str = "PROGRESS";
const STATE_SUCCESS: &str = "SUCCESS";

#[derive(Debug, Clone, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<ImportTask>,
}

/// A server-side EV task as reported by `/app/api/get-tasks/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportTask {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub state: String,
    #[serde(default)]
    pub details: Option<TaskDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDetails {
    #[serde(default)]
    pub mode: Option<String>,
}

// EV is not consistent about whether task ids are numbers or strings.
fn id_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }
    Ok(match Repr::deserialize(de)? {
        Repr::Num(n) => n.to_string(),
        Repr::Str(s) => s,
    })
}

/// Poll cadence and ceiling for the wait loop.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    /// Hard ceiling on total wait; exceeding it yields
    /// [`ClientError::ImportTimeout`] instead of blocking forever.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// What one pass over the task list tells us to do next.
#[derive(Debug, PartialEq, Eq)]
struct PollPass {
    /// Import tasks that reached SUCCESS and should be deleted server-side.
    completed: Vec<String>,
    /// Whether any import task is still running.
    in_progress: bool,
}

fn classify_tasks(tasks: &[ImportTask]) -> PollPass {
    let mut completed = Vec::new();
    let mut in_progress = false;
    for task in tasks {
        let mode = task.details.as_ref().and_then(|d| d.mode.as_deref());
        if mode != Some(IMPORT_MODE) {
            continue;
        }
        match task.state.as_str() {
            STATE_SUCCESS => completed.push(task.id.clone()),
            STATE_PROGRESS => in_progress = true,
            // Finished some other way; nothing to clean up.
            _ => {}
        }
    }
    PollPass { completed, in_progress }
}

impl EvSession {
    /// Kicks off EV's online-banking import for the given bank accounts and
    /// blocks until every import-mode task has left the PROGRESS state.
    pub async fn trigger_import(
        &mut self,
        bankaccount_ids: &[String],
        poll: PollConfig,
    ) -> Result<(), ClientError> {
        // The trigger POST needs a CSRF token scoped to the bookkeeping page.
        self.get_page("/app/bookkeeping/").await?;
        self.post_json(
            "/app/finapi/onlinebankingimport/",
            &serde_json::json!({ "bankAccounts": bankaccount_ids }),
        )
        .await?;
        self.wait_for_import(poll).await
    }

    async fn wait_for_import(&mut self, poll: PollConfig) -> Result<(), ClientError> {
        tracing::info!("waiting for EV online-banking tasks to complete");
        let deadline = Instant::now() + poll.timeout;
        loop {
            let list: TaskList = self.get_json("/app/api/get-tasks/").await?;
            let pass = classify_tasks(&list.tasks);

            for id in &pass.completed {
                // Best-effort cleanup; EV keeps finished tasks around otherwise.
                if let Err(err) = self.get_ok(&format!("/app/api/delete-task/{id}")).await {
                    tracing::warn!(task = %id, error = %err, "could not delete completed EV task");
                }
            }

            if !pass.in_progress {
                break;
            }
            if Instant::now() >= deadline {
                return Err(ClientError::ImportTimeout(poll.timeout));
            }
            tokio::time::sleep(poll.interval).await;
        }
        tracing::info!("all EV online-banking tasks completed");
        Ok(())
    }
}
