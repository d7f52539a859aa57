use chrono::{DateTime, Local};
use std::path::Path;

/// Wall-clock timestamp, second resolution: `2025-08-06T14:03:22`.
pub fn now_stamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Date stamp: `2025-08-06`.
pub fn date_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Filesystem-safe timestamp slug for scratch directories: `20250806_140322`.
pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Modification time of `path` in `now_stamp` format, or None if the file
/// does not exist or its mtime cannot be read.
pub fn iso_mtime(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    let mtime = meta.modified().ok()?;
    let dt: DateTime<Local> = mtime.into();
    Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stamp_formats() {
        assert_eq!(now_stamp().len(), 19);
        assert_eq!(date_stamp().len(), 10);
        assert_eq!(timestamp_slug().len(), 15);
        assert!(now_stamp().starts_with(&date_stamp()));
    }

    #[test]
    fn iso_mtime_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "x").unwrap();
        let mtime = iso_mtime(&path).unwrap();
        assert_eq!(mtime.len(), 19);
    }

    #[test]
    fn iso_mtime_missing_file() {
        assert!(iso_mtime(Path::new("/nonexistent/f.txt")).is_none());
    }
}
