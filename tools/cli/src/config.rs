//! Settings persistence for the CLI.
//!
//! The sync core never persists state itself; the settings record lives
//! here, as JSON under the user config directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use gitvault_sync::SyncSettings;

/// Default settings file location.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("No user config directory available")?;
    Ok(base.join("gitvault").join("settings.json"))
}

/// Load settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<SyncSettings> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("Invalid settings file: {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SyncSettings::default()),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read settings: {}", path.display()))
        }
    }
}

/// Save settings, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &SyncSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write settings: {}", path.display()))
}
