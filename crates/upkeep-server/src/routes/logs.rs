use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::{paths, UpkeepError};

/// GET /logs/{filename} : plain-text job log. The filename is validated
/// against a safe pattern and the resolved path must stay inside the log
/// directory, so `..` and symlink tricks both dead-end in a 404.
pub async fn get_log(
    Path(filename): Path<String>,
    State(app): State<AppState>,
) -> Result<Response, AppError> {
    paths::validate_log_filename(&filename)?;

    let log_dir = app.log_dir();
    let content = tokio::task::spawn_blocking(move || -> upkeep_core::Result<String> {
        let dir = log_dir
            .canonicalize()
            .map_err(|_| UpkeepError::LogNotFound(filename.clone()))?;
        let target = dir
            .join(&filename)
            .canonicalize()
            .map_err(|_| UpkeepError::LogNotFound(filename.clone()))?;
        if !target.starts_with(&dir) {
            return Err(UpkeepError::LogNotFound(filename.clone()));
        }
        Ok(std::fs::read_to_string(&target)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}
