use crate::action::{default_actions, ActionSpec};
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret required via the `x-upkeep-token` header when set.
    #[serde(default)]
    pub token: Option<String>,
    /// Log directory; relative paths resolve against the project root.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8790
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(paths::LOGS_DIR)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: None,
            log_dir: default_log_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputSpec
// ---------------------------------------------------------------------------

/// A generated artifact whose freshness the status endpoint reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub path: PathBuf,
}

fn default_outputs() -> Vec<OutputSpec> {
    vec![
        OutputSpec {
            name: "docs_html".into(),
            path: PathBuf::from("docs/index.html"),
        },
        OutputSpec {
            name: "pm_html".into(),
            path: PathBuf::from("reports/pm.html"),
        },
        OutputSpec {
            name: "issues_html".into(),
            path: PathBuf::from("reports/issues.html"),
        },
    ]
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_outputs")]
    pub outputs: Vec<OutputSpec>,
    #[serde(default = "default_actions")]
    pub actions: Vec<ActionSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            outputs: default_outputs(),
            actions: default_actions(),
        }
    }
}

impl Config {
    /// Load `.upkeep/config.yaml`, falling back to full defaults when the
    /// file does not exist. A present-but-invalid file is an error; silent
    /// fallback there would mask typos in the action whitelist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Absolute log directory for this project.
    pub fn log_dir(&self, root: &Path) -> PathBuf {
        if self.server.log_dir.is_absolute() {
            self.server.log_dir.clone()
        } else {
            root.join(&self.server.log_dir)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
