use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{info, warn};
use upkeep_core::action::ActionRegistry;
use upkeep_core::job::{JobStatus, JobTable};
use upkeep_core::timefmt::now_stamp;

/// Everything the worker task needs; shared with the routes through Arcs.
pub(crate) struct WorkerContext {
    pub root: PathBuf,
    pub registry: Arc<ActionRegistry>,
    pub jobs: Arc<Mutex<JobTable>>,
}

/// Spawn the single job consumer. Jobs arrive as ids over the channel in
/// submission order and run strictly one at a time; the channel replaces
/// the queue list + running flag of a hand-rolled worker loop.
pub(crate) fn spawn(ctx: WorkerContext, mut rx: mpsc::UnboundedReceiver<String>) {
    tokio::spawn(async move {
        while let Some(job_id) = rx.recv().await {
            run_job(&ctx, &job_id).await;
        }
    });
}

async fn run_job(ctx: &WorkerContext, job_id: &str) {
    // Bookkeeping under the lock; the subprocess runs outside it.
    let (action, log_path) = {
        let mut table = ctx.jobs.lock().expect("job table lock poisoned");
        let Some(job) = table.get_mut(job_id) else {
            return;
        };
        job.status = JobStatus::Running;
        job.started_at = Some(now_stamp());
        (job.action.clone(), job.log_path.clone())
    };

    info!(job = %job_id, action = %action, "job started");

    // The registry is immutable after startup, so a missing action here
    // means a submit bug, not a race.
    let exit_code = match ctx.registry.get(&action) {
        Some(spec) => execute(&ctx.root, &spec.commands, &log_path).await,
        None => -1,
    };

    let mut table = ctx.jobs.lock().expect("job table lock poisoned");
    if let Some(job) = table.get_mut(job_id) {
        job.ended_at = Some(now_stamp());
        job.exit_code = Some(exit_code);
        job.status = if exit_code == 0 {
            JobStatus::Done
        } else {
            JobStatus::Error
        };
    }
    let failed = table
        .get(job_id)
        .filter(|j| j.status == JobStatus::Error)
        .cloned();
    match failed {
        Some(job) => {
            table.record_error(&job);
            warn!(job = %job_id, action = %action, exit_code, "job failed");
        }
        None => info!(job = %job_id, action = %action, "job done"),
    }
}

/// Run the action's commands sequentially in `root`, stopping at the first
/// non-zero exit. Combined stdout/stderr goes to the log file, with a
/// `RUN:` stamp line before each command. Returns the last exit code
/// observed, -1 for spawn or I/O failures.
async fn execute(root: &Path, commands: &[Vec<String>], log_path: &Path) -> i32 {
    if let Some(parent) = log_path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return -1;
        }
    }
    let mut log = match std::fs::File::create(log_path) {
        Ok(f) => f,
        Err(e) => {
            warn!(log = %log_path.display(), error = %e, "cannot open job log");
            return -1;
        }
    };

    let mut exit_code = 0;
    for cmd in commands {
        let Some((program, args)) = cmd.split_first() else {
            continue;
        };
        let _ = writeln!(log, "[{}] RUN: {}", now_stamp(), cmd.join(" "));
        let _ = log.flush();

        let (out, err) = match (log.try_clone(), log.try_clone()) {
            (Ok(a), Ok(b)) => (a, b),
            _ => {
                exit_code = -1;
                break;
            }
        };

        let spawned = tokio::process::Command::new(program)
            .args(args)
            .current_dir(root)
            .stdout(Stdio::from(out))
            .stderr(Stdio::from(err))
            .spawn();

        match spawned {
            Ok(mut child) => match child.wait().await {
                Ok(status) => {
                    exit_code = status.code().unwrap_or(-1);
                    if exit_code != 0 {
                        break;
                    }
                }
                Err(e) => {
                    let _ = writeln!(log, "[{}] ERROR: wait failed: {e}", now_stamp());
                    exit_code = -1;
                    break;
                }
            },
            Err(e) => {
                let _ = writeln!(
                    log,
                    "[{}] ERROR: failed to spawn '{program}': {e}",
                    now_stamp()
                );
                exit_code = -1;
                break;
            }
        }
    }
    exit_code
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
