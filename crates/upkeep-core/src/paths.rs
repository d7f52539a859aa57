use crate::error::{Result, UpkeepError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const UPKEEP_DIR: &str = ".upkeep";
pub const DATA_DIR: &str = ".upkeep/data";
pub const LOGS_DIR: &str = ".upkeep/logs";
pub const REINTEGRATION_DIR: &str = ".upkeep/reintegration";
pub const SCRATCH_DIR: &str = ".upkeep/reintegration/scratch";

pub const CONFIG_FILE: &str = ".upkeep/config.yaml";

pub const QUICK_ISSUES_FILE: &str = "quick_issues.json";
pub const PROJECT_LOG_FILE: &str = "simple_project.json";
pub const UI_STYLE_FILE: &str = "ui_style_selection.json";
pub const PROJECT_CONTEXT_MD: &str = "project_context.md";

pub const REINTEGRATION_REPORT: &str = "last_reintegration.json";
pub const REINTEGRATION_MD: &str = "last_reintegration.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn upkeep_dir(root: &Path) -> PathBuf {
    root.join(UPKEEP_DIR)
}

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn quick_issues_path(root: &Path) -> PathBuf {
    data_dir(root).join(QUICK_ISSUES_FILE)
}

pub fn project_log_path(root: &Path) -> PathBuf {
    data_dir(root).join(PROJECT_LOG_FILE)
}

pub fn ui_style_path(root: &Path) -> PathBuf {
    data_dir(root).join(UI_STYLE_FILE)
}

pub fn project_context_md_path(root: &Path) -> PathBuf {
    upkeep_dir(root).join(PROJECT_CONTEXT_MD)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn scratch_root(root: &Path) -> PathBuf {
    root.join(SCRATCH_DIR)
}

pub fn reintegration_report_path(root: &Path) -> PathBuf {
    root.join(REINTEGRATION_DIR).join(REINTEGRATION_REPORT)
}

pub fn reintegration_md_path(root: &Path) -> PathBuf {
    root.join(REINTEGRATION_DIR).join(REINTEGRATION_MD)
}

// ---------------------------------------------------------------------------
// Log filename validation
// ---------------------------------------------------------------------------

static LOG_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn log_name_re() -> &'static Regex {
    LOG_NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*\.log$").unwrap())
}

/// Validate a log filename taken from a URL path segment. Rejects anything
/// that could escape the log directory (separators, leading dots, empty).
pub fn validate_log_filename(name: &str) -> Result<()> {
    if name.len() > 128 || !log_name_re().is_match(name) {
        return Err(UpkeepError::InvalidLogFilename(name.to_string()));
    }
    Ok(())
}

/// Per-job log filename: `<job id>_<action>.log` with separators flattened.
pub fn job_log_filename(job_id: &str, action: &str) -> String {
    format!("{job_id}_{action}.log").replace(['/', '\\'], "_")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
