use crate::error::{Result, UpkeepError};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ActionSpec
// ---------------------------------------------------------------------------

/// A whitelisted maintenance action: an ordered list of argv command lines
/// run sequentially, stopping at the first non-zero exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub label: String,
    pub description: String,
    pub commands: Vec<Vec<String>>,
    /// Shell one-liner equivalent, shown in the panel so the action can be
    /// run by hand when the server is down.
    pub fallback_cmd: String,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Built-in registry used when the config file defines no actions.
pub fn default_actions() -> Vec<ActionSpec> {
    let render_docs = vec![argv(&["scripts/render_docs.sh"])];
    let render_pm = vec![argv(&["scripts/render_pm.sh"])];
    let issues_export = vec![
        argv(&["scripts/export_issues.sh", "json"]),
        argv(&["scripts/export_issues.sh", "html"]),
    ];

    let mut refresh_all = Vec::new();
    refresh_all.extend(render_docs.iter().cloned());
    refresh_all.extend(render_pm.iter().cloned());
    refresh_all.extend(issues_export.iter().cloned());

    vec![
        ActionSpec {
            id: "render_docs".into(),
            label: "Render docs".into(),
            description: "Refresh the generated docs pages from markdown.".into(),
            commands: render_docs,
            fallback_cmd: "scripts/render_docs.sh".into(),
        },
        ActionSpec {
            id: "render_pm".into(),
            label: "Render PM report".into(),
            description: "Refresh the project-management report pages.".into(),
            commands: render_pm,
            fallback_cmd: "scripts/render_pm.sh".into(),
        },
        ActionSpec {
            id: "issues_export".into(),
            label: "Export issues".into(),
            description: "Regenerate the issue list JSON and HTML exports.".into(),
            commands: issues_export,
            fallback_cmd: "scripts/export_issues.sh json && scripts/export_issues.sh html".into(),
        },
        ActionSpec {
            id: "refresh_all".into(),
            label: "Refresh all".into(),
            description: "Render docs + PM report + issue exports.".into(),
            commands: refresh_all,
            fallback_cmd: "scripts/render_docs.sh && scripts/render_pm.sh && \
                           scripts/export_issues.sh json && scripts/export_issues.sh html"
                .into(),
        },
    ]
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Ordered action whitelist. Lookup failures surface as `InvalidAction`,
/// which the server maps to 400.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: Vec<ActionSpec>,
}

impl ActionRegistry {
    pub fn new(actions: Vec<ActionSpec>) -> Self {
        Self { actions }
    }

    pub fn get(&self, id: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn lookup(&self, id: &str) -> Result<&ActionSpec> {
        self.get(id)
            .ok_or_else(|| UpkeepError::InvalidAction(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new(default_actions())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
