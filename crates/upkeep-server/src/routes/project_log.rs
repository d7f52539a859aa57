use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::project_log::{self, ProjectLog, ProjectLogPatch};
use upkeep_core::{io, paths, store};

/// GET /api/simple-project : current project log.
pub async fn get_simple_project(
    State(app): State<AppState>,
) -> Result<Json<ProjectLog>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || {
        store::load_or_init::<ProjectLog>(&paths::project_log_path(&root))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}

/// POST /api/simple-project : merge named fields into the log and rewrite
/// the markdown companion.
pub async fn post_simple_project(
    State(app): State<AppState>,
    Json(patch): Json<ProjectLogPatch>,
) -> Result<Json<ProjectLog>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || -> upkeep_core::Result<ProjectLog> {
        let path = paths::project_log_path(&root);
        let mut doc: ProjectLog = store::load_or_init(&path)?;
        project_log::apply(&mut doc, patch);
        store::save_json(&path, &doc)?;
        io::atomic_write(
            &paths::project_context_md_path(&root),
            project_log::render_markdown(&doc).as_bytes(),
        )?;
        Ok(doc)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}
