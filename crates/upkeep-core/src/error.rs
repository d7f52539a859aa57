use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpkeepError {
    #[error("unknown action: {0}")]
    InvalidAction(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("log not found: {0}")]
    LogNotFound(String),

    #[error("invalid log filename: {0}")]
    InvalidLogFilename(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("title required")]
    TitleRequired,

    #[error("id required")]
    IssueIdRequired,

    #[error("no '{0}' directory found in source path")]
    SubdirNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, UpkeepError>;
