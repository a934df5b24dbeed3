pub mod ask;
pub mod levels;
pub mod serve;
pub mod status;

use robotutor_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file used when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// Load config from `path` (or the default location) with env overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = AppConfig::load_with_overrides(&path)
        .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}
