use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use evsync_sync::{HttpHostSink, StatementSource, SweepReport};

mod config;

#[derive(Parser)]
#[command(
    name = "evsync",
    about = "Pulls bank statements from EV into the ticketing platform's bank-transfer import"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "evsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the import sweep across all configured organizers.
    Sweep {
        /// Skip the 6-hour guard and sweep unconditionally.
        #[arg(long)]
        force: bool,
    },
    /// Fetch and print the normalized statement for one organizer.
    Fetch {
        organizer: String,
        /// Trailing window of days to request.
        #[arg(long)]
        days_back: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let mut source = cfg.ev.source();

    match cli.command {
        Command::Sweep { force } => {
            let sink = HttpHostSink::new(&cfg.host.base_url, cfg.host.token.clone());
            if force {
                let report = evsync_sync::run_sweep(&cfg.organizers, &source, &sink).await;
                log_report(&report);
            } else {
                match evsync_sync::run_if_due(&cfg.organizers, &source, &sink, Utc::now()).await? {
                    Some(report) => log_report(&report),
                    None => tracing::info!("latest bank-import job is recent, sweep not due"),
                }
            }
        }
        Command::Fetch { organizer, days_back } => {
            let org = cfg
                .organizers
                .iter()
                .find(|o| o.organizer == organizer)
                .with_context(|| format!("organizer {organizer:?} not in config"))?;
            let api_key = org
                .api_key
                .as_deref()
                .context("organizer has no EV API key configured")?;
            if let Some(days) = days_back {
                source.days_back = days;
            }
            let rows = source.fetch_statement(org, api_key).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

fn log_report(report: &SweepReport) {
    for (organizer, job) in &report.imported {
        tracing::info!(%organizer, job, "import job created");
    }
    tracing::info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "sweep finished"
    );
}
