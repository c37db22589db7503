use std::collections::HashMap;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use uptrack_core::api::{CliError, TaskEvent, TaskId, TaskStats, TrackerConfig, UploadTracker};

use super::cli::Args;
use crate::utils::descriptor_for;

/// Exit code when at least one file was rejected by the upload policy.
pub const EXIT_REJECTED: i32 = 3;
pub const EXIT_CONFIG: i32 = 11;
pub const EXIT_IO: i32 = 20;

/// Exit code for a run that ended in an error. Rejections are not errors,
/// they come back from [`run`] as [`EXIT_REJECTED`].
pub fn exit_code_for_error(e: &CliError) -> i32 {
    match e {
        CliError::Config(_) => EXIT_CONFIG,
        CliError::Io(_) | CliError::Command(_) => EXIT_IO,
    }
}

/// Final state of a watch run.
#[derive(Debug, Clone)]
pub struct WatchSummary {
    pub stats: TaskStats,
    pub rejected: usize,
}

impl WatchSummary {
    pub fn exit_code(&self) -> i32 {
        if self.rejected > 0 {
            EXIT_REJECTED
        } else {
            0
        }
    }
}

struct EventPrinter {
    json: bool,
    names: HashMap<TaskId, String>,
}

impl EventPrinter {
    fn print(&mut self, event: &TaskEvent) {
        if let TaskEvent::Submitted { task_id, name, .. } = event {
            self.names.insert(*task_id, name.clone());
        }

        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("failed to encode event: {}", e),
            }
            return;
        }

        let ts = event.timestamp().format("%H:%M:%S%.3f");
        let name = |id: &TaskId| self.names.get(id).cloned().unwrap_or_else(|| id.to_string());
        match event {
            TaskEvent::Submitted { name, .. } => println!("[{ts}] {name}: submitted"),
            TaskEvent::StatusChanged {
                task_id,
                to,
                retries,
                ..
            } => println!("[{ts}] {}: {to} (retries {retries})", name(task_id)),
            TaskEvent::Retried {
                task_id,
                retries,
                outcome,
                ..
            } => println!("[{ts}] {}: retry {retries} ({outcome:?})", name(task_id)),
            TaskEvent::Rejected { name, reason, .. } => {
                println!("[{ts}] {name}: rejected ({reason})")
            }
        }
    }
}

pub async fn run(args: Args, cfg: TrackerConfig) -> Result<i32, CliError> {
    let tracker = UploadTracker::from_config(&cfg);
    let summary = watch(&tracker, &args).await?;
    Ok(summary.exit_code())
}

/// Submits `args.files`, applies `--cancel`, then prints events until every
/// accepted task reached a terminal status.
pub async fn watch(tracker: &UploadTracker, args: &Args) -> Result<WatchSummary, CliError> {
    let mut events = tracker.subscribe();
    let mut printer = EventPrinter {
        json: args.json,
        names: HashMap::new(),
    };

    let mut accepted: Vec<(String, TaskId)> = Vec::new();
    let mut rejected = 0usize;
    for path in &args.files {
        let file = descriptor_for(path, args.mime.as_deref()).await?;
        let name = file.display_name.clone();
        match tracker.submit_file(file).await {
            Ok(id) => accepted.push((name, id)),
            Err(err) => {
                rejected += 1;
                if !args.json {
                    eprintln!("{name}: {err}");
                }
            }
        }
    }

    for wanted in &args.cancel {
        let mut matched = false;
        for (_, id) in accepted.iter().filter(|(name, _)| name == wanted) {
            matched |= tracker.cancel_task(*id).await;
        }
        if !matched {
            tracing::warn!(name = %wanted, "no cancellable task with that name");
        }
    }

    loop {
        if tracker.is_idle().await {
            loop {
                match events.try_recv() {
                    Ok(event) => printer.print(&event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event printer lagged")
                    }
                    Err(_) => break,
                }
            }
            break;
        }

        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => printer.print(&event),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let cancelled = tracker.cancel_all().await;
                tracing::info!(cancelled, "interrupted");
            }
        }
    }

    let stats = tracker.stats().await;
    tracing::info!(
        success = stats.success,
        failed = stats.failed,
        cancelled = stats.cancelled,
        rejected,
        "all tasks finished"
    );
    if !args.json {
        println!(
            "done: {} succeeded, {} failed, {} cancelled, {} rejected",
            stats.success, stats.failed, stats.cancelled, rejected
        );
    }

    Ok(WatchSummary { stats, rejected })
}
