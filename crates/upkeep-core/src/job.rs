use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Rolling error-log capacity; older entries are dropped first.
pub const ERROR_LOG_CAP: usize = 200;

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a job. Monotonic: `Queued` → `Running` → `Done` | `Error`.
/// Terminal jobs are never re-run; a re-submission gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub action: String,
    pub status: JobStatus,
    pub log_path: PathBuf,
    pub log_url: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub exit_code: Option<i32>,
}

impl Job {
    pub fn new(id: String, action: String, log_path: PathBuf, log_url: String) -> Self {
        Self {
            id,
            action,
            status: JobStatus::Queued,
            log_path,
            log_url,
            started_at: None,
            ended_at: None,
            exit_code: None,
        }
    }
}

/// Opaque job token: 10 hex chars of a v4 UUID.
pub fn new_job_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

// ---------------------------------------------------------------------------
// ErrorEntry
// ---------------------------------------------------------------------------

/// Snapshot of a failed job kept in the rolling error log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub id: String,
    pub action: String,
    pub exit_code: Option<i32>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub log_url: String,
}

impl From<&Job> for ErrorEntry {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            action: job.action.clone(),
            exit_code: job.exit_code,
            started_at: job.started_at.clone(),
            ended_at: job.ended_at.clone(),
            log_url: job.log_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// JobTable
// ---------------------------------------------------------------------------

/// Append-only job bookkeeping: every submitted job stays in the table for
/// the lifetime of the server. All mutation happens under the owner's lock.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: HashMap<String, Job>,
    order: Vec<String>,
    error_log: Vec<ErrorEntry>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job: Job) {
        self.order.push(job.id.clone());
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    /// Most recent `n` jobs, newest first.
    pub fn recent(&self, n: usize) -> Vec<Job> {
        self.order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| self.jobs.get(id).cloned())
            .collect()
    }

    /// Jobs currently queued or running, in submission order.
    pub fn active(&self) -> Vec<Job> {
        self.order
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .filter(|j| j.status.is_active())
            .cloned()
            .collect()
    }

    /// Record a failed job, dropping the oldest entries past the cap.
    pub fn record_error(&mut self, job: &Job) {
        self.error_log.push(ErrorEntry::from(job));
        if self.error_log.len() > ERROR_LOG_CAP {
            let excess = self.error_log.len() - ERROR_LOG_CAP;
            self.error_log.drain(..excess);
        }
    }

    /// Most recent `n` error entries, newest first.
    pub fn recent_errors(&self, n: usize) -> Vec<ErrorEntry> {
        self.error_log.iter().rev().take(n).cloned().collect()
    }

    pub fn clear_errors(&mut self) {
        self.error_log.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
