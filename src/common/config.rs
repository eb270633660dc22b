//! Configuration file handling
//!
//! The config file is TOML on disk, but the harness addresses it as a flat
//! key space of dotted keys (`appium.server.url`, `android.device.type`, ...)
//! the way the rest of the crate expects. Nested tables are flattened at load
//! time; separator rewriting for path-like values happens at read time.

use std::collections::HashMap;
use std::path::{Path, MAIN_SEPARATOR};
use std::sync::OnceLock;

use super::paths;
use super::{Error, Result};

/// Flat key/value configuration, immutable after load
#[derive(Debug, Default, Clone)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// search locations (`./appdriver.toml`, then the platform config dir)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => paths::find_config_file()?,
        };

        let content =
            std::fs::read_to_string(&path).map_err(|e| Error::config_read(&path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;

        let mut values = HashMap::new();
        flatten_table(&table, "", &mut values)?;
        Ok(Self { values })
    }

    /// Look up a key, rewriting path separators for path-like values
    ///
    /// Values whose key contains "path" or "directory" have both `/` and `\`
    /// occurrences rewritten to the host separator. The rewrite is applied on
    /// every read, and is idempotent.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = self.values.get(key)?;
        if key.contains("path") || key.contains("directory") {
            Some(normalize_separators(value))
        } else {
            Some(value.clone())
        }
    }

    /// Look up a key, failing with the key name when absent
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key).ok_or_else(|| Error::MissingKey(key.to_string()))
    }

    /// All keys, for display
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

/// Rewrite both separator conventions to the host one
fn normalize_separators(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Flatten nested TOML tables into dotted keys
fn flatten_table(
    table: &toml::Table,
    prefix: &str,
    out: &mut HashMap<String, String>,
) -> Result<()> {
    for (key, value) in table {
        let flat_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            toml::Value::Table(inner) => flatten_table(inner, &flat_key, out)?,
            toml::Value::String(s) => {
                out.insert(flat_key, s.clone());
            }
            toml::Value::Integer(n) => {
                out.insert(flat_key, n.to_string());
            }
            toml::Value::Float(f) => {
                out.insert(flat_key, f.to_string());
            }
            toml::Value::Boolean(b) => {
                out.insert(flat_key, b.to_string());
            }
            toml::Value::Datetime(d) => {
                out.insert(flat_key, d.to_string());
            }
            toml::Value::Array(_) => {
                return Err(Error::ConfigParse(format!(
                    "unsupported array value at key '{flat_key}'"
                )));
            }
        }
    }
    Ok(())
}

/// Once-per-process configuration cell
///
/// The configuration is loaded exactly once; later `load_from` calls return
/// the cached value. `get` before any load is a fail-fast error rather than
/// an implicit load, so a broken config file surfaces at the call site that
/// asked for it.
pub struct ConfigStore {
    cell: OnceLock<Config>,
}

impl ConfigStore {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Load and cache the configuration, or return the already-cached value
    pub fn load_from(&self, path: Option<&Path>) -> Result<&Config> {
        if let Some(config) = self.cell.get() {
            return Ok(config);
        }
        let config = Config::load(path)?;
        Ok(self.cell.get_or_init(|| config))
    }

    /// Get the cached configuration, failing if nothing was loaded
    pub fn get(&self) -> Result<&Config> {
        self.cell.get().ok_or(Error::ConfigNotLoaded)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide configuration used by the CLI entry point
pub static CONFIG: ConfigStore = ConfigStore::new();
