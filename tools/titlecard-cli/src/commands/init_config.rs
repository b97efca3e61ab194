//! Write the effective configuration to disk.

use std::path::PathBuf;

use titlecard_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}; pass --force to overwrite",
            path.display()
        );
    }

    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
    println!("Config written: {}", path.display());
    Ok(())
}
