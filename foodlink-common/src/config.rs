//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(db_path) = config.get("database_path").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(db_path));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder().join("foodlink.db"))
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/foodlink/config.toml first, then /etc/foodlink/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("foodlink").join("config.toml"));
        let system_config = PathBuf::from("/etc/foodlink/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("foodlink").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("foodlink"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/foodlink"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("foodlink"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/foodlink"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("foodlink"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\foodlink"))
    } else {
        PathBuf::from("./foodlink_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let path = resolve_database_path(Some("/tmp/custom.db"), "FOODLINK_TEST_UNSET").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn falls_back_to_default_folder() {
        let path = resolve_database_path(None, "FOODLINK_TEST_UNSET").unwrap();
        assert!(path.ends_with("foodlink.db"));
    }
}
