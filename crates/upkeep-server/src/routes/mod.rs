pub mod issues;
pub mod jobs;
pub mod logs;
pub mod project_log;
pub mod status;
pub mod ui_style;
