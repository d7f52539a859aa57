use anyhow::Result;
use std::path::{Path, PathBuf};
use upkeep_core::config::Config;

/// Load the project config, apply CLI overrides, and run the server until
/// ctrl-c.
pub fn run(
    root: &Path,
    host: Option<String>,
    port: Option<u16>,
    token: Option<String>,
    log_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load(root)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(token) = token {
        config.server.token = Some(token);
    }
    if let Some(log_dir) = log_dir {
        config.server.log_dir = log_dir;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        tokio::select! {
            res = upkeep_server::serve(root_buf, config) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
