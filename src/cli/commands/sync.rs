//! Sync command implementations: one manual cycle, or a periodic watch.

use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::cli::commands::{block_on, open_library, print_json};
use crate::config::Overrides;
use crate::error::{Error, Result};
use crate::sync::{ConflictKind, ManualSync, SyncOutcome, SyncReport};

/// Run one manual sync cycle.
///
/// A failed cycle is printed, then surfaced as [`Error::SyncFailed`] so the
/// exit code reflects it.
pub fn sync(overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (config, library) = open_library(overrides)?;
    tracing::info!(remote = %config.remote_url, "Manual sync");

    let report = match block_on(library.on_manual_sync())? {
        ManualSync::Ran(report) => report,
        ManualSync::Dropped => return Err(Error::SyncInFlight),
    };

    print_report(&report, json)?;

    match report.failure_reason {
        Some(reason) => Err(Error::SyncFailed(reason)),
        None => Ok(()),
    }
}

/// Run sync cycles every `interval` seconds until Ctrl-C.
pub fn watch(interval: Option<u64>, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let overrides = Overrides {
        sync_interval_secs: interval,
        ..overrides.clone()
    };
    let (config, library) = open_library(&overrides)?;
    let every = config.sync_interval();

    if !json {
        println!(
            "Watching {} every {}s (Ctrl-C to stop)",
            config.remote_url.cyan(),
            every.as_secs()
        );
    }

    block_on(async {
        let mut reports = library.subscribe();
        let printer = async {
            loop {
                match reports.recv().await {
                    Ok(report) => {
                        if let Err(e) = print_report(&report, json) {
                            warn!(error = %e, "Failed to print sync report");
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Report printer fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };

        tokio::select! {
            () = library.run_periodic(every, shutdown_signal()) => {}
            () = printer => {}
        }
    })?;

    if !json {
        println!("Stopped.");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C, stopping");
    }
}

fn print_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }

    let time = report.finished_at.with_timezone(&chrono::Local).format("%H:%M:%S");
    match report.outcome {
        SyncOutcome::Updated => {
            println!(
                "{} {} {} added, {} updated",
                time.to_string().dimmed(),
                "Updated".green().bold(),
                report.stats.added,
                report.stats.updated
            );
        }
        SyncOutcome::Unchanged => {
            println!(
                "{} {} ({} remote quotes, nothing new)",
                time.to_string().dimmed(),
                "Unchanged".bold(),
                report.stats.total()
            );
        }
        SyncOutcome::Failed => {
            println!(
                "{} {} {}",
                time.to_string().dimmed(),
                "Failed".red().bold(),
                report.failure_reason.as_deref().unwrap_or("unknown error")
            );
        }
    }

    for conflict in &report.conflicts {
        let label = match conflict.kind {
            ConflictKind::RemoteUpdate => "updated".cyan(),
            ConflictKind::Conflict => "conflict".yellow(),
        };
        println!(
            "  {label} \"{}\": {} → {}",
            conflict.text, conflict.local_category, conflict.remote_category
        );
    }
    Ok(())
}
