use std::path::PathBuf;

use anyhow::Result;
use schooldesk_core::config::Settings;

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Settings::config_path()?,
    };

    if path.exists() {
        anyhow::bail!("Config file already exists at {}", path.display());
    }

    Settings::create_default_config(&path)?;
    println!("Created {}", path.display());

    Ok(())
}
