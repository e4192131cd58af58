use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

const ENV_HOME_OVERRIDE: &str = "SMUS_MIGRATE_HOME";

/// Base config directory (~/.config/smus-migrate/ on all platforms, or `$SMUS_MIGRATE_HOME`)
pub fn smus_migrate() -> Result<PathBuf> {
    if let Ok(dir) = env::var(ENV_HOME_OVERRIDE) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("smus-migrate"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("smus-migrate"))
    }
}

/// Global config.json file path
pub fn config_json() -> Result<PathBuf> {
    Ok(smus_migrate()?.join("config.json"))
}
