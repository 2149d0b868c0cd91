//! Remove build output.

use std::path::Path;

use anyhow::Result;

use crate::config::ConfigFile;

/// Run the clean command.
pub async fn run(config: &ConfigFile) -> Result<()> {
    let output_dir = Path::new(&config.site.output_dir);

    if strata_static::clean(output_dir)? {
        tracing::info!("Removed {}", output_dir.display());
    } else {
        tracing::info!("Nothing to clean at {}", output_dir.display());
    }

    Ok(())
}
