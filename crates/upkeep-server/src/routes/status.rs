use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::issues::QuickIssues;
use upkeep_core::project_log::ProjectLog;
use upkeep_core::timefmt::{iso_mtime, now_stamp};
use upkeep_core::ui_style::UiStyle;
use upkeep_core::{paths, store};

/// GET / : liveness line for anyone poking the port by hand.
pub async fn index() -> &'static str {
    "upkeep control panel running.\n"
}

/// GET /api/status : aggregate snapshot of jobs, documents, actions, and
/// generated-output freshness.
pub async fn get_status(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let (jobs, active_jobs, error_jobs) = {
        let table = app.jobs.lock().expect("job table lock poisoned");
        (table.recent(8), table.active(), table.recent_errors(50))
    };

    type Snapshot = (
        Vec<(String, Option<String>)>,
        QuickIssues,
        ProjectLog,
        UiStyle,
    );

    let root = app.root.clone();
    let config = app.config.clone();
    let (outputs, quick_issues, project_log, ui_style) =
        tokio::task::spawn_blocking(move || -> upkeep_core::Result<Snapshot> {
            let outputs: Vec<(String, Option<String>)> = config
                .outputs
                .iter()
                .map(|o| (o.name.clone(), iso_mtime(&root.join(&o.path))))
                .collect();
            let quick_issues: QuickIssues = store::load_or_init(&paths::quick_issues_path(&root))?;
            let project_log: ProjectLog = store::load_or_init(&paths::project_log_path(&root))?;
            let ui_style: UiStyle = store::load_or_init(&paths::ui_style_path(&root))?;
            Ok((outputs, quick_issues, project_log, ui_style))
        })
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let outputs_json: serde_json::Map<String, serde_json::Value> = outputs
        .into_iter()
        .map(|(name, mtime)| (name, serde_json::json!(mtime)))
        .collect();

    let actions: Vec<serde_json::Value> = app
        .registry
        .iter()
        .map(|a| {
            serde_json::json!({
                "id": a.id,
                "label": a.label,
                "description": a.description,
                "fallback_cmd": a.fallback_cmd,
            })
        })
        .collect();

    let active: Vec<serde_json::Value> = active_jobs
        .iter()
        .map(|j| serde_json::json!({ "id": j.id, "action": j.action, "status": j.status }))
        .collect();

    Ok(Json(serde_json::json!({
        "ok": true,
        "server_time": now_stamp(),
        "root": app.root,
        "api_base": app.api_base(),
        "outputs": outputs_json,
        "quick_issues": {
            "count": quick_issues.issues.len(),
            "updated_at": quick_issues.updated_at,
        },
        "simple_project": {
            "title": project_log.title,
            "updated_at": project_log.updated_at,
        },
        "ui_style": ui_style,
        "actions": actions,
        "jobs": jobs,
        "active_jobs": active,
        "error_jobs": error_jobs,
    })))
}
