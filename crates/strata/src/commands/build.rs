//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use strata_static::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config: &ConfigFile) -> Result<()> {
    tracing::info!("Building site...");

    let build_config = BuildConfig {
        content_dir: PathBuf::from(&config.site.content_dir),
        output_dir: PathBuf::from(&config.site.output_dir),
    };

    let result = tokio::task::spawn_blocking(move || StaticBuilder::new(build_config).build())
        .await
        .context("Build task panicked")??;

    tracing::info!("Built {} pages in {}ms", result.pages, result.duration_ms);
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
