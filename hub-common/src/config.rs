//! Configuration loading and root folder resolution

use crate::Result;
use std::path::PathBuf;

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Some(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Path of the SQLite database file inside the root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join("hub.db")
}

/// Locate the platform configuration file, if one exists
fn find_config_file() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/creator-hub/config.toml first, then /etc/creator-hub/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("creator-hub").join("config.toml")) {
            if path.exists() {
                return Some(path);
            }
        }
        let system_config = PathBuf::from("/etc/creator-hub/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        None
    } else {
        dirs::config_dir()
            .map(|d| d.join("creator-hub").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("creator-hub"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/creator-hub"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("creator-hub"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/creator-hub"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("creator-hub"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\creator-hub"))
    } else {
        PathBuf::from("./creator_hub_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let resolved = resolve_root_folder(Some("/tmp/hub-test"), "HUB_TEST_UNSET_VAR").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/hub-test"));
    }

    #[test]
    fn test_database_path() {
        let path = database_path(std::path::Path::new("/data/hub"));
        assert_eq!(path, PathBuf::from("/data/hub/hub.db"));
    }
}
