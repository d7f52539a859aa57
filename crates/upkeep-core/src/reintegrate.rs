use crate::error::{Result, UpkeepError};
use crate::io::{atomic_write, ensure_dir};
use crate::manifest;
use crate::store::save_json;
use crate::timefmt::{date_stamp, now_stamp, timestamp_slug};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

// ---------------------------------------------------------------------------
// Options / report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReintegrateOptions {
    /// External checkout to scan: either the subdirectory itself or a path
    /// containing it as an immediate child.
    pub source: PathBuf,
    /// Name of the subdirectory to locate, e.g. `.upkeep`.
    pub subdir: String,
    /// Local equivalent tree the copy is compared against.
    pub local_dir: PathBuf,
    /// Where timestamped scratch copies accumulate.
    pub scratch_root: PathBuf,
    pub report_path: Option<PathBuf>,
    pub markdown_path: Option<PathBuf>,
}

/// How the scratch copy was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Only version-control-tracked files, preserving ignore semantics.
    Tracked,
    /// Full recursive copy with the fixed ignore list.
    Full,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub total_current: usize,
    pub total_incoming: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub timestamp: String,
    pub date: String,
    pub source_root: PathBuf,
    pub source_dir: PathBuf,
    pub scratch_copy: PathBuf,
    pub copy_mode: CopyMode,
    pub tracked_count: Option<usize>,
    pub skipped_missing: usize,
    pub warnings: Vec<String>,
    pub counts: DiffCounts,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

// ---------------------------------------------------------------------------
// Source location
// ---------------------------------------------------------------------------

/// Locate the named subdirectory: the source path itself (matched by file
/// name) or an immediate child. Returns (source root, subdirectory).
pub fn find_subdir(source: &Path, subdir: &str) -> Result<(PathBuf, PathBuf)> {
    if source.is_dir() && source.file_name().is_some_and(|n| n == subdir) {
        let root = source.parent().unwrap_or(Path::new(".")).to_path_buf();
        return Ok((root, source.to_path_buf()));
    }
    let candidate = source.join(subdir);
    if candidate.is_dir() {
        return Ok((source.to_path_buf(), candidate));
    }
    Err(UpkeepError::SubdirNotFound(subdir.to_string()))
}

// ---------------------------------------------------------------------------
// Tracked-file detection
// ---------------------------------------------------------------------------

/// Paths tracked by git under `rel_dir`, relative to `root`. None when the
/// source is not a git checkout or git is unavailable; callers fall back to
/// a full copy and record a warning.
fn git_tracked_files(root: &Path, rel_dir: &Path) -> Option<Vec<PathBuf>> {
    if !root.join(".git").exists() {
        return None;
    }
    which::which("git").ok()?;
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["ls-files", "-z", "--"])
        .arg(rel_dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(
        stdout
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Copy only tracked files into `dest`. Returns how many tracked paths were
/// missing from the working tree (staged deletes, mid-rebase states).
fn copy_tracked(
    source_root: &Path,
    rel_dir: &Path,
    dest: &Path,
    tracked: &[PathBuf],
) -> Result<usize> {
    ensure_dir(dest)?;
    let mut skipped = 0usize;
    for rel_path in tracked {
        let name = rel_path.file_name().map(|n| n.to_string_lossy());
        if name.as_deref().is_some_and(manifest::is_ignored_file) {
            continue;
        }
        if rel_path
            .components()
            .any(|c| manifest::is_ignored_dir(&c.as_os_str().to_string_lossy()))
        {
            continue;
        }
        let src = source_root.join(rel_path);
        if !src.is_file() {
            skipped += 1;
            continue;
        }
        let Ok(inner) = rel_path.strip_prefix(rel_dir) else {
            continue;
        };
        let target = dest.join(inner);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(&src, &target)?;
    }
    Ok(skipped)
}

/// Full recursive copy of `src` into `dest`, pruning the ignore list.
fn copy_full(src: &Path, dest: &Path) -> Result<()> {
    ensure_dir(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if manifest::is_ignored_dir(&name) {
                continue;
            }
            copy_full(&entry.path(), &dest.join(&name))?;
        } else if file_type.is_file() {
            if manifest::is_ignored_file(&name) {
                continue;
            }
            std::fs::copy(entry.path(), dest.join(&name))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Copy the external subdirectory into a timestamped scratch folder, build
/// manifests of the copy and the local tree, and report the diff. Fails
/// only when the subdirectory cannot be located; everything else downgrades
/// to report warnings.
pub fn run(opts: &ReintegrateOptions) -> Result<Report> {
    let (source_root, source_dir) = find_subdir(&opts.source, &opts.subdir)?;
    ensure_dir(&opts.scratch_root)?;

    let scratch_copy = opts.scratch_root.join(format!(
        "{}_{}",
        opts.subdir.trim_start_matches('.'),
        timestamp_slug()
    ));

    let rel_dir = source_dir
        .strip_prefix(&source_root)
        .unwrap_or(&source_dir)
        .to_path_buf();
    let tracked = git_tracked_files(&source_root, &rel_dir);

    let mut warnings = Vec::new();
    let (copy_mode, tracked_count, skipped_missing) = match &tracked {
        Some(files) => {
            let skipped = copy_tracked(&source_root, &rel_dir, &scratch_copy, files)?;
            if skipped > 0 {
                warnings.push(format!(
                    "{skipped} tracked file(s) missing from the working tree were skipped."
                ));
            }
            (CopyMode::Tracked, Some(files.len()), skipped)
        }
        None => {
            copy_full(&source_dir, &scratch_copy)?;
            warnings.push(
                "Source is not a git checkout; ignore rules were approximated.".to_string(),
            );
            (CopyMode::Full, None, 0)
        }
    };

    let incoming = manifest::build_manifest(&scratch_copy)?;
    // The scratch area may live inside the local tree; keep the fresh copy
    // (and older ones) out of the local manifest.
    let current =
        manifest::build_manifest_pruned(&opts.local_dir, &[opts.scratch_root.clone()])?;
    let diff = manifest::diff(&current, &incoming);

    let report = Report {
        timestamp: now_stamp(),
        date: date_stamp(),
        source_root,
        source_dir,
        scratch_copy,
        copy_mode,
        tracked_count,
        skipped_missing,
        warnings,
        counts: DiffCounts {
            added: diff.added.len(),
            removed: diff.removed.len(),
            changed: diff.changed.len(),
            unchanged: diff.unchanged.len(),
            total_current: current.len(),
            total_incoming: incoming.len(),
        },
        added: diff.added,
        removed: diff.removed,
        changed: diff.changed,
    };

    if let Some(path) = &opts.report_path {
        save_json(path, &report)?;
    }
    if let Some(path) = &opts.markdown_path {
        atomic_write(path, render_markdown(&report).as_bytes())?;
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Markdown summary
// ---------------------------------------------------------------------------

const MARKDOWN_CHANGED_LIMIT: usize = 50;

pub fn render_markdown(report: &Report) -> String {
    let mut lines = vec![
        "# Reintegration Summary".to_string(),
        String::new(),
        format!("- Timestamp: {}", report.timestamp),
        format!("- Source: {}", report.source_dir.display()),
        format!("- Scratch copy: {}", report.scratch_copy.display()),
        String::new(),
        "## Counts".to_string(),
        format!("- Added: {}", report.counts.added),
        format!("- Removed: {}", report.counts.removed),
        format!("- Changed: {}", report.counts.changed),
        format!("- Unchanged: {}", report.counts.unchanged),
        String::new(),
    ];
    if !report.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &report.warnings {
            lines.push(format!("- {warning}"));
        }
        lines.push(String::new());
    }
    lines.push(format!("## Changed Files (top {MARKDOWN_CHANGED_LIMIT})"));
    for path in report.changed.iter().take(MARKDOWN_CHANGED_LIMIT) {
        lines.push(format!("- {path}"));
    }
    if report.changed.len() > MARKDOWN_CHANGED_LIMIT {
        lines.push(format!(
            "- ... {} more",
            report.changed.len() - MARKDOWN_CHANGED_LIMIT
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Source checkout (no .git, so full-copy mode) and a local tree that
    /// differ by one added, one removed, and one changed file.
    fn fixture(dir: &TempDir) -> ReintegrateOptions {
        let source = dir.path().join("external");
        let local = dir.path().join("local/.upkeep");
        std::fs::create_dir_all(source.join(".upkeep/nested")).unwrap();
        std::fs::create_dir_all(&local).unwrap();

        // Unchanged on both sides.
        std::fs::write(source.join(".upkeep/same.txt"), "same").unwrap();
        std::fs::write(local.join("same.txt"), "same").unwrap();
        // Changed content.
        std::fs::write(source.join(".upkeep/nested/changed.txt"), "new body").unwrap();
        std::fs::create_dir_all(local.join("nested")).unwrap();
        std::fs::write(local.join("nested/changed.txt"), "old body").unwrap();
        // Added: incoming only. Removed: local only.
        std::fs::write(source.join(".upkeep/added.txt"), "fresh").unwrap();
        std::fs::write(local.join("removed.txt"), "stale").unwrap();

        ReintegrateOptions {
            source,
            subdir: ".upkeep".to_string(),
            local_dir: local,
            scratch_root: dir.path().join("scratch"),
            report_path: Some(dir.path().join("report.json")),
            markdown_path: Some(dir.path().join("report.md")),
        }
    }

    #[test]
    fn find_subdir_direct_match() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join(".upkeep");
        std::fs::create_dir_all(&sub).unwrap();
        let (root, found) = find_subdir(&sub, ".upkeep").unwrap();
        assert_eq!(root, dir.path());
        assert_eq!(found, sub);
    }

    #[test]
    fn find_subdir_immediate_child() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join(".upkeep");
        std::fs::create_dir_all(&sub).unwrap();
        let (root, found) = find_subdir(dir.path(), ".upkeep").unwrap();
        assert_eq!(root, dir.path());
        assert_eq!(found, sub);
    }

    #[test]
    fn find_subdir_missing_fails() {
        let dir = TempDir::new().unwrap();
        let err = find_subdir(dir.path(), ".upkeep").unwrap_err();
        assert!(matches!(err, UpkeepError::SubdirNotFound(_)));
    }

    #[test]
    fn run_reports_added_removed_changed() {
        let dir = TempDir::new().unwrap();
        let opts = fixture(&dir);
        let report = run(&opts).unwrap();

        assert_eq!(report.counts.added, 1);
        assert_eq!(report.counts.removed, 1);
        assert_eq!(report.counts.changed, 1);
        assert_eq!(report.counts.unchanged, 1);
        assert_eq!(report.added, ["added.txt"]);
        assert_eq!(report.removed, ["removed.txt"]);
        assert_eq!(report.changed, ["nested/changed.txt"]);
        assert_eq!(report.copy_mode, CopyMode::Full);
        assert!(
            report.warnings.iter().any(|w| w.contains("not a git checkout")),
            "full copy mode must warn about reduced ignore fidelity"
        );
    }

    #[test]
    fn run_writes_scratch_copy_and_reports() {
        let dir = TempDir::new().unwrap();
        let opts = fixture(&dir);
        let report = run(&opts).unwrap();

        assert!(report.scratch_copy.starts_with(dir.path().join("scratch")));
        assert!(report.scratch_copy.join("same.txt").is_file());
        assert!(dir.path().join("report.json").is_file());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(json["counts"]["added"], 1);
        assert_eq!(json["copy_mode"], "full");

        let md = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(md.contains("# Reintegration Summary"));
        assert!(md.contains("- Changed: 1"));
        assert!(md.contains("- nested/changed.txt"));
    }

    #[test]
    fn run_prunes_scratch_inside_local_tree() {
        let dir = TempDir::new().unwrap();
        let mut opts = fixture(&dir);
        // Scratch root inside the local tree, as the default layout has it.
        opts.scratch_root = opts.local_dir.join("reintegration/scratch");
        opts.report_path = None;
        opts.markdown_path = None;

        let report = run(&opts).unwrap();
        assert!(
            report.removed.iter().all(|p| !p.starts_with("reintegration/")),
            "scratch copies must not show up as removed files: {:?}",
            report.removed
        );
        assert_eq!(report.counts.removed, 1);
    }

    #[test]
    fn copy_full_prunes_ignored_dirs() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("node_modules/pkg")).unwrap();
        std::fs::write(src.join("node_modules/pkg/x.js"), "x").unwrap();
        std::fs::write(src.join("keep.txt"), "x").unwrap();

        let dest = dir.path().join("dest");
        copy_full(&src, &dest).unwrap();
        assert!(dest.join("keep.txt").is_file());
        assert!(!dest.join("node_modules").exists());
    }

    #[test]
    fn markdown_truncates_changed_list() {
        let changed: Vec<String> = (0..60).map(|i| format!("file{i:02}.txt")).collect();
        let report = Report {
            timestamp: "2025-08-06T12:00:00".into(),
            date: "2025-08-06".into(),
            source_root: PathBuf::from("/ext"),
            source_dir: PathBuf::from("/ext/.upkeep"),
            scratch_copy: PathBuf::from("/tmp/scratch/upkeep_20250806_120000"),
            copy_mode: CopyMode::Tracked,
            tracked_count: Some(60),
            skipped_missing: 0,
            warnings: vec![],
            counts: DiffCounts {
                added: 0,
                removed: 0,
                changed: 60,
                unchanged: 0,
                total_current: 60,
                total_incoming: 60,
            },
            added: vec![],
            removed: vec![],
            changed,
        };
        let md = render_markdown(&report);
        assert!(md.contains("file49.txt"));
        assert!(!md.contains("file50.txt"));
        assert!(md.contains("- ... 10 more"));
    }
}
