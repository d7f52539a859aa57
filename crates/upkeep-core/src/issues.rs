use crate::error::{Result, UpkeepError};
use crate::timefmt::{date_stamp, now_stamp};
use serde::{Deserialize, Serialize};

/// Issue id prefix: ids read `QI-YYYY-MM-NNN`, sequenced per month.
pub const ISSUE_ID_PREFIX: &str = "QI";

// ---------------------------------------------------------------------------
// Enumerated fields
// ---------------------------------------------------------------------------

/// Issue workflow status. Unknown inputs normalize to `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl IssueStatus {
    pub fn normalize(value: Option<&str>) -> Self {
        match value.unwrap_or("").trim().to_lowercase().as_str() {
            "open" => IssueStatus::Open,
            "in_progress" => IssueStatus::InProgress,
            "closed" => IssueStatus::Closed,
            _ => IssueStatus::Open,
        }
    }
}

/// Issue priority. Unknown inputs normalize to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    High,
    #[default]
    Medium,
    Low,
}

impl IssuePriority {
    pub fn normalize(value: Option<&str>) -> Self {
        match value.unwrap_or("").trim().to_lowercase().as_str() {
            "high" => IssuePriority::High,
            "medium" => IssuePriority::Medium,
            "low" => IssuePriority::Low,
            _ => IssuePriority::Medium,
        }
    }
}

// ---------------------------------------------------------------------------
// Issue / QuickIssues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub owner: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickIssues {
    pub updated_at: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl Default for QuickIssues {
    fn default() -> Self {
        Self {
            updated_at: date_stamp(),
            issues: Vec::new(),
        }
    }
}

/// Next id for the month of `date` (`YYYY-MM-DD`): one past the highest
/// existing sequence number sharing the `QI-YYYY-MM-` prefix.
pub fn next_issue_id(issues: &[Issue], date: &str) -> String {
    let prefix = format!("{}-{}-{}-", ISSUE_ID_PREFIX, &date[..4], &date[5..7]);
    let max = issues
        .iter()
        .filter_map(|i| i.id.strip_prefix(&prefix))
        .filter_map(|tail| tail.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix, max + 1)
}

// ---------------------------------------------------------------------------
// IssuePatch
// ---------------------------------------------------------------------------

/// Tags arrive either as a JSON list or as a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    List(Vec<String>),
    Csv(String),
}

impl TagInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagInput::List(tags) => tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagInput::Csv(s) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// Request payload for POST /api/quick-issues. Only fields present in the
/// body are applied; enumerated fields normalize at this boundary.
#[derive(Debug, Default, Deserialize)]
pub struct IssuePatch {
    pub action: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub owner: Option<String>,
    pub tags: Option<TagInput>,
    pub notes: Option<String>,
}

fn normalize_owner(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "unassigned".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Apply a create/update/close payload to the document. The action defaults
/// to `update` when an id is supplied and `create` otherwise.
pub fn apply(doc: &mut QuickIssues, patch: IssuePatch) -> Result<()> {
    let action = patch
        .action
        .as_deref()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| {
            if patch.id.is_some() {
                "update".to_string()
            } else {
                "create".to_string()
            }
        });

    let today = date_stamp();
    let stamp = now_stamp();

    match action.as_str() {
        "create" => {
            let title = patch.title.as_deref().unwrap_or("").trim().to_string();
            if title.is_empty() {
                return Err(UpkeepError::TitleRequired);
            }
            let issue = Issue {
                id: next_issue_id(&doc.issues, &today),
                title,
                status: IssueStatus::normalize(patch.status.as_deref()),
                priority: IssuePriority::normalize(patch.priority.as_deref()),
                owner: normalize_owner(patch.owner.as_deref().unwrap_or("unassigned")),
                tags: patch.tags.map(TagInput::into_vec).unwrap_or_default(),
                notes: patch.notes.as_deref().unwrap_or("").trim().to_string(),
                created_at: stamp.clone(),
                updated_at: stamp,
            };
            doc.issues.push(issue);
        }
        "update" | "close" => {
            let id = patch.id.as_deref().unwrap_or("").trim().to_string();
            if id.is_empty() {
                return Err(UpkeepError::IssueIdRequired);
            }
            let issue = doc
                .issues
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| UpkeepError::IssueNotFound(id))?;

            if action == "close" {
                issue.status = IssueStatus::Closed;
            }
            if let Some(title) = &patch.title {
                issue.title = title.trim().to_string();
            }
            if let Some(status) = &patch.status {
                issue.status = IssueStatus::normalize(Some(status));
            }
            if let Some(priority) = &patch.priority {
                issue.priority = IssuePriority::normalize(Some(priority));
            }
            if let Some(owner) = &patch.owner {
                issue.owner = normalize_owner(owner);
            }
            if let Some(tags) = patch.tags {
                issue.tags = tags.into_vec();
            }
            if let Some(notes) = &patch.notes {
                issue.notes = notes.trim().to_string();
            }
            issue.updated_at = stamp;
        }
        other => return Err(UpkeepError::InvalidAction(other.to_string())),
    }

    doc.updated_at = today;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn create_patch(title: &str) -> IssuePatch {
        IssuePatch {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_allocates_sequential_ids() {
        let mut doc = QuickIssues::default();
        apply(&mut doc, create_patch("first")).unwrap();
        apply(&mut doc, create_patch("second")).unwrap();
        apply(&mut doc, create_patch("third")).unwrap();

        let ids: Vec<&str> = doc.issues.iter().map(|i| i.id.as_str()).collect();
        let month = &date_stamp()[..7];
        assert_eq!(ids[0], format!("QI-{month}-001"));
        assert!(ids[1].ends_with("-002"));
        assert!(ids[2].ends_with("-003"));
        // Strictly increasing, no gaps.
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn next_id_skips_foreign_prefixes() {
        let mut doc = QuickIssues::default();
        apply(&mut doc, create_patch("current month")).unwrap();
        doc.issues[0].id = "QI-1999-01-007".to_string();
        let id = next_issue_id(&doc.issues, &date_stamp());
        assert!(id.ends_with("-001"), "old-month ids must not count: {id}");
    }

    #[test]
    fn create_requires_title() {
        let mut doc = QuickIssues::default();
        let err = apply(&mut doc, create_patch("   ")).unwrap_err();
        assert!(matches!(err, UpkeepError::TitleRequired));
        assert!(doc.issues.is_empty());
    }

    #[test]
    fn create_normalizes_enums_and_owner() {
        let mut doc = QuickIssues::default();
        let patch = IssuePatch {
            title: Some("bad build".into()),
            status: Some("BOGUS".into()),
            priority: Some("  HIGH ".into()),
            owner: Some("   ".into()),
            ..Default::default()
        };
        apply(&mut doc, patch).unwrap();
        let issue = &doc.issues[0];
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.priority, IssuePriority::High);
        assert_eq!(issue.owner, "unassigned");
    }

    #[test]
    fn tags_accept_csv_or_list() {
        assert_eq!(
            TagInput::Csv("ci, docs , ,infra".into()).into_vec(),
            vec!["ci", "docs", "infra"]
        );
        assert_eq!(
            TagInput::List(vec!["a".into(), " b ".into()]).into_vec(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn update_applies_only_named_fields() {
        let mut doc = QuickIssues::default();
        apply(
            &mut doc,
            IssuePatch {
                title: Some("flaky test".into()),
                notes: Some("seen on ci".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let id = doc.issues[0].id.clone();

        apply(
            &mut doc,
            IssuePatch {
                id: Some(id),
                priority: Some("low".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let issue = &doc.issues[0];
        assert_eq!(issue.priority, IssuePriority::Low);
        assert_eq!(issue.title, "flaky test", "unnamed fields untouched");
        assert_eq!(issue.notes, "seen on ci");
    }

    #[test]
    fn close_forces_closed_status() {
        let mut doc = QuickIssues::default();
        apply(&mut doc, create_patch("to close")).unwrap();
        let id = doc.issues[0].id.clone();

        apply(
            &mut doc,
            IssuePatch {
                action: Some("close".into()),
                id: Some(id),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(doc.issues[0].status, IssueStatus::Closed);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut doc = QuickIssues::default();
        let err = apply(
            &mut doc,
            IssuePatch {
                id: Some("QI-2020-01-999".into()),
                title: Some("ghost".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, UpkeepError::IssueNotFound(_)));
    }

    #[test]
    fn update_without_id_is_rejected() {
        let mut doc = QuickIssues::default();
        let err = apply(
            &mut doc,
            IssuePatch {
                action: Some("update".into()),
                title: Some("no id".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, UpkeepError::IssueIdRequired));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut doc = QuickIssues::default();
        let err = apply(
            &mut doc,
            IssuePatch {
                action: Some("destroy".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, UpkeepError::InvalidAction(_)));
    }
}
