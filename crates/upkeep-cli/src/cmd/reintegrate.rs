use crate::output::print_json;
use anyhow::Result;
use std::path::{Path, PathBuf};
use upkeep_core::paths;
use upkeep_core::reintegrate::{self, ReintegrateOptions};

/// One-shot reintegration pass: copy, manifest, diff, report.
pub fn run(
    root: &Path,
    source: PathBuf,
    subdir: String,
    scratch_root: Option<PathBuf>,
    report: Option<PathBuf>,
    markdown: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let opts = ReintegrateOptions {
        source,
        local_dir: root.join(&subdir),
        subdir,
        scratch_root: scratch_root.unwrap_or_else(|| paths::scratch_root(root)),
        report_path: Some(report.unwrap_or_else(|| paths::reintegration_report_path(root))),
        markdown_path: Some(markdown.unwrap_or_else(|| paths::reintegration_md_path(root))),
    };

    let summary = reintegrate::run(&opts)?;

    if json {
        return print_json(&summary);
    }

    println!("Reintegration summary:");
    println!("Source: {}", summary.source_dir.display());
    println!("Scratch copy: {}", summary.scratch_copy.display());
    println!("Added: {}", summary.counts.added);
    println!("Removed: {}", summary.counts.removed);
    println!("Changed: {}", summary.counts.changed);
    for warning in &summary.warnings {
        println!("Warning: {warning}");
    }
    if let Some(path) = &opts.report_path {
        println!("Report: {}", path.display());
    }
    Ok(())
}
