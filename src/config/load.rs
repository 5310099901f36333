use super::{ConfigError, Settings};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "CHATRELAY_CONFIG";

/// Explicit path wins over `CHATRELAY_CONFIG`; with neither, settings come
/// from the environment alone.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match resolve_config_path(explicit) {
        Some(path) => {
            let mut settings = Settings::from_path(&path)?;
            settings.apply_env_overrides();
            settings
        }
        None => Settings::from_env(),
    };
    settings.validate()?;
    Ok(settings)
}
