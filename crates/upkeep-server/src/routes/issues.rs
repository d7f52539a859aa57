use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::issues::{self, IssuePatch, QuickIssues};
use upkeep_core::{paths, store};

/// GET /api/quick-issues : current issue list, default-initialized on
/// first read.
pub async fn get_quick_issues(
    State(app): State<AppState>,
) -> Result<Json<QuickIssues>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || {
        store::load_or_init::<QuickIssues>(&paths::quick_issues_path(&root))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}

/// POST /api/quick-issues : create, update, or close an issue; returns the
/// full updated document.
pub async fn post_quick_issues(
    State(app): State<AppState>,
    Json(patch): Json<IssuePatch>,
) -> Result<Json<QuickIssues>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || -> upkeep_core::Result<QuickIssues> {
        let path = paths::quick_issues_path(&root);
        let mut doc: QuickIssues = store::load_or_init(&path)?;
        issues::apply(&mut doc, patch)?;
        store::save_json(&path, &doc)?;
        Ok(doc)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}
