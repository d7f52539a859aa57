use crate::worker;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use upkeep_core::action::ActionRegistry;
use upkeep_core::config::Config;
use upkeep_core::job::{new_job_id, Job, JobTable};
use upkeep_core::paths;

/// Shared application state passed to all route handlers. One mutex guards
/// all job bookkeeping; the lock is only held for short sections and never
/// across a subprocess wait.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub registry: Arc<ActionRegistry>,
    pub jobs: Arc<Mutex<JobTable>>,
    job_tx: mpsc::UnboundedSender<String>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config) -> Self {
        let registry = Arc::new(ActionRegistry::new(config.actions.clone()));
        let jobs = Arc::new(Mutex::new(JobTable::new()));
        let (job_tx, job_rx) = mpsc::unbounded_channel();

        // Single consumer task drains the channel, so at most one job is
        // ever running. Guard: only spawn when inside a Tokio runtime
        // (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            worker::spawn(
                worker::WorkerContext {
                    root: root.clone(),
                    registry: registry.clone(),
                    jobs: jobs.clone(),
                },
                job_rx,
            );
        }

        Self {
            root,
            config: Arc::new(config),
            registry,
            jobs,
            job_tx,
        }
    }

    /// Base URL the panel advertises for itself and its log links.
    pub fn api_base(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.server.host, self.config.server.port
        )
    }

    /// Absolute log directory for this project.
    pub fn log_dir(&self) -> PathBuf {
        self.config.log_dir(&self.root)
    }

    /// Enqueue a job for a whitelisted action. Fails with `InvalidAction`
    /// for unknown ids. The returned job is `queued`; the worker owns all
    /// later status transitions.
    pub fn submit(&self, action_id: &str) -> upkeep_core::Result<Job> {
        self.registry.lookup(action_id)?;
        let id = new_job_id();
        let filename = paths::job_log_filename(&id, action_id);
        let log_path = self.log_dir().join(&filename);
        let log_url = format!("{}/logs/{}", self.api_base(), filename);
        let job = Job::new(id.clone(), action_id.to_string(), log_path, log_url);

        self.jobs
            .lock()
            .expect("job table lock poisoned")
            .insert(job.clone());
        // Receiver lives as long as the worker task; a send can only fail
        // after runtime shutdown, where the queued job is moot anyway.
        let _ = self.job_tx.send(id);
        Ok(job)
    }
}
