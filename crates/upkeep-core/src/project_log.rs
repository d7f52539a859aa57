use crate::timefmt::date_stamp;
use serde::{Deserialize, Serialize};

const DEFAULT_TITLE: &str = "Untitled project";
const DEFAULT_SUMMARY: &str = "Describe the current focus, scope, and key decisions here.";

// ---------------------------------------------------------------------------
// ProjectLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLog {
    pub title: String,
    pub summary: String,
    pub updated_at: String,
    #[serde(default)]
    pub entries: Vec<LogEntry>,
}

impl Default for ProjectLog {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
            updated_at: date_stamp(),
            entries: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectLogPatch
// ---------------------------------------------------------------------------

/// Request payload for POST /api/simple-project. `entries` replaces the
/// whole list; `entry` appends a single update stamped with today's date.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectLogPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub entries: Option<Vec<LogEntry>>,
    pub entry: Option<String>,
}

pub fn apply(doc: &mut ProjectLog, patch: ProjectLogPatch) {
    if let Some(title) = &patch.title {
        let trimmed = title.trim();
        doc.title = if trimmed.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            trimmed.to_string()
        };
    }
    if let Some(summary) = &patch.summary {
        doc.summary = summary.trim().to_string();
    }
    if let Some(entries) = patch.entries {
        doc.entries = entries;
    }
    if let Some(entry) = &patch.entry {
        let text = entry.trim();
        if !text.is_empty() {
            doc.entries.push(LogEntry {
                date: date_stamp(),
                text: text.to_string(),
            });
        }
    }
    doc.updated_at = date_stamp();
}

// ---------------------------------------------------------------------------
// Markdown rendering
// ---------------------------------------------------------------------------

/// Human-readable `project_context.md` companion, rewritten on every save.
pub fn render_markdown(doc: &ProjectLog) -> String {
    let title = if doc.title.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        doc.title.trim()
    };
    let summary = if doc.summary.trim().is_empty() {
        DEFAULT_SUMMARY
    } else {
        doc.summary.trim()
    };

    let mut lines = vec![
        "# Project Log".to_string(),
        String::new(),
        "## Title".to_string(),
        title.to_string(),
        String::new(),
        "## Summary".to_string(),
        summary.to_string(),
        String::new(),
        "## Recent Updates".to_string(),
    ];
    if doc.entries.is_empty() {
        lines.push("- No updates logged yet.".to_string());
    } else {
        for entry in &doc.entries {
            lines.push(format!("- {}: {}", entry.date, entry.text));
        }
    }
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_merges_named_fields_only() {
        let mut doc = ProjectLog::default();
        apply(
            &mut doc,
            ProjectLogPatch {
                title: Some("  Widget rewrite ".into()),
                ..Default::default()
            },
        );
        assert_eq!(doc.title, "Widget rewrite");
        assert_eq!(doc.summary, DEFAULT_SUMMARY, "summary untouched");
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        let mut doc = ProjectLog::default();
        doc.title = "Something".into();
        apply(
            &mut doc,
            ProjectLogPatch {
                title: Some("   ".into()),
                ..Default::default()
            },
        );
        assert_eq!(doc.title, DEFAULT_TITLE);
    }

    #[test]
    fn entry_appends_dated_line() {
        let mut doc = ProjectLog::default();
        apply(
            &mut doc,
            ProjectLogPatch {
                entry: Some("shipped the exporter".into()),
                ..Default::default()
            },
        );
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].text, "shipped the exporter");
        assert_eq!(doc.entries[0].date, date_stamp());
    }

    #[test]
    fn blank_entry_is_ignored() {
        let mut doc = ProjectLog::default();
        apply(
            &mut doc,
            ProjectLogPatch {
                entry: Some("  ".into()),
                ..Default::default()
            },
        );
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn entries_field_replaces_list() {
        let mut doc = ProjectLog::default();
        doc.entries.push(LogEntry {
            date: "2024-01-01".into(),
            text: "old".into(),
        });
        apply(
            &mut doc,
            ProjectLogPatch {
                entries: Some(vec![LogEntry {
                    date: "2025-06-01".into(),
                    text: "new".into(),
                }]),
                ..Default::default()
            },
        );
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].text, "new");
    }

    #[test]
    fn markdown_lists_entries() {
        let mut doc = ProjectLog::default();
        doc.title = "Exporter".into();
        doc.entries.push(LogEntry {
            date: "2025-06-01".into(),
            text: "kickoff".into(),
        });
        let md = render_markdown(&doc);
        assert!(md.starts_with("# Project Log\n"));
        assert!(md.contains("## Title\nExporter"));
        assert!(md.contains("- 2025-06-01: kickoff"));
    }

    #[test]
    fn markdown_handles_empty_log() {
        let md = render_markdown(&ProjectLog::default());
        assert!(md.contains("- No updates logged yet."));
        assert!(md.ends_with('\n'));
    }
}
