//! Configuration file discovery
//!
//! A config file next to the test suite wins; otherwise the platform config
//! directory is consulted:
//! - Linux: `~/.config/appdriver/config.toml`
//! - macOS: `~/Library/Application Support/appdriver/config.toml`
//! - Windows: `%APPDATA%\appdriver\config.toml`

use std::path::PathBuf;

use super::{Error, Result};

const APP_NAME: &str = "appdriver";

/// Config file name looked for in the working directory
const LOCAL_CONFIG: &str = "appdriver.toml";

/// Get the platform configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Candidate config file locations, in precedence order
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = config_dir() {
        candidates.push(dir.join("config.toml"));
    }
    candidates
}

/// Find the first existing config file, failing with the searched locations
pub fn find_config_file() -> Result<PathBuf> {
    let candidates = config_candidates();
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }

    let searched = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::ConfigRead {
        path: searched,
        error: "no config file found".to_string(),
    })
}
