use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;
use upkeep_core::io::tail_lines;
use upkeep_core::job::Job;
use upkeep_core::UpkeepError;

#[derive(Deserialize)]
pub struct RunBody {
    pub action: String,
}

/// POST /api/run : submit a job for a whitelisted action. Returns the
/// queued job; progress is polled via /api/jobs/{id}.
pub async fn run_action(
    State(app): State<AppState>,
    Json(body): Json<RunBody>,
) -> Result<Json<Job>, AppError> {
    let job = app.submit(&body.action)?;
    info!(job = %job.id, action = %job.action, "job submitted");
    Ok(Json(job))
}

#[derive(Deserialize)]
pub struct TailQuery {
    #[serde(default)]
    pub tail: usize,
}

/// GET /api/jobs/{id} : job state; `?tail=N` adds the last N log lines.
pub async fn get_job(
    Path(id): Path<String>,
    Query(query): Query<TailQuery>,
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let job = app
        .jobs
        .lock()
        .expect("job table lock poisoned")
        .get(&id)
        .cloned()
        .ok_or(UpkeepError::JobNotFound(id))?;

    let mut value = serde_json::to_value(&job)?;
    if query.tail > 0 {
        let log_path = job.log_path.clone();
        let tail = tokio::task::spawn_blocking(move || tail_lines(&log_path, query.tail))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("log_tail".to_string(), serde_json::json!(tail));
        }
    }
    Ok(Json(value))
}

/// POST /api/errors/clear : empty the rolling error log.
pub async fn clear_errors(State(app): State<AppState>) -> Json<serde_json::Value> {
    app.jobs
        .lock()
        .expect("job table lock poisoned")
        .clear_errors();
    Json(serde_json::json!({ "status": "cleared" }))
}
