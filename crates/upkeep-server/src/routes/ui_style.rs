use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::ui_style::{self, UiStyle, UiStylePatch};
use upkeep_core::{paths, store};

/// GET /api/ui-style : current template selection.
pub async fn get_ui_style(State(app): State<AppState>) -> Result<Json<UiStyle>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || {
        store::load_or_init::<UiStyle>(&paths::ui_style_path(&root))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}

/// POST /api/ui-style : merge named fields into the selection.
pub async fn post_ui_style(
    State(app): State<AppState>,
    Json(patch): Json<UiStylePatch>,
) -> Result<Json<UiStyle>, AppError> {
    let root = app.root.clone();
    let doc = tokio::task::spawn_blocking(move || -> upkeep_core::Result<UiStyle> {
        let path = paths::ui_style_path(&root);
        let mut doc: UiStyle = store::load_or_init(&path)?;
        ui_style::apply(&mut doc, patch);
        store::save_json(&path, &doc)?;
        Ok(doc)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(doc))
}
