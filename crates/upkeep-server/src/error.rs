use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use upkeep_core::UpkeepError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<UpkeepError>() {
            match e {
                UpkeepError::InvalidAction(_)
                | UpkeepError::InvalidLogFilename(_)
                | UpkeepError::TitleRequired
                | UpkeepError::IssueIdRequired => StatusCode::BAD_REQUEST,
                UpkeepError::JobNotFound(_)
                | UpkeepError::LogNotFound(_)
                | UpkeepError::IssueNotFound(_)
                | UpkeepError::SubdirNotFound(_) => StatusCode::NOT_FOUND,
                UpkeepError::Io(_) | UpkeepError::Json(_) | UpkeepError::Yaml(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
