//! Live rendering server command.

use std::path::PathBuf;

use anyhow::Result;
use strata_server::{PageServer, ServeConfig};

use crate::config::ConfigFile;

/// Run the serve command. Flags override the config file.
pub async fn run(
    config: &ConfigFile,
    port: Option<u16>,
    host: Option<String>,
    open: bool,
) -> Result<()> {
    let content_dir = PathBuf::from(&config.site.content_dir);
    if !content_dir.is_dir() {
        anyhow::bail!("Content directory not found: {}", content_dir.display());
    }

    let serve_config = ServeConfig {
        content_dir,
        port: port.unwrap_or(config.server.port),
        host: host.unwrap_or_else(|| config.server.host.clone()),
        open,
    };

    PageServer::new(serve_config).start().await?;

    Ok(())
}
