//! Error types for the appdriver harness
//!
//! Error messages are designed to identify the missing configuration key or
//! failing external piece directly, so a test run aborts with something
//! actionable.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the appdriver harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration not loaded. Call ConfigStore::load_from() first")]
    ConfigNotLoaded,

    #[error("Failed to read config file '{path}': {error}")]
    ConfigRead { path: String, error: String },

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Missing configuration key '{0}'")]
    MissingKey(String),

    // === Session Errors ===
    #[error("No driver session active. Call initialize() first")]
    SessionNotInitialized,

    #[error("Automation server rejected session ({status}): {message}")]
    SessionStart { status: u16, message: String },

    #[error("Invalid automation server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    // === Platform/Device Errors ===
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Emulator name is missing in configuration")]
    EmulatorNameMissing,

    #[error("Emulator did not finish booting within {0} seconds")]
    BootTimeout(u64),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === HTTP Errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a session-start rejection error from a server response
    pub fn session_start(status: u16, message: impl Into<String>) -> Self {
        Self::SessionStart {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid server URL error
    pub fn invalid_server_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidServerUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a config read error for a path
    pub fn config_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::ConfigRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
