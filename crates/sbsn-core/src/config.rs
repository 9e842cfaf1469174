//! Configuration resolution for SBSN.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/sbsn/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)
//!
//! The token signing secret is not part of this file format; it is only ever
//! read from the environment or the command line.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Upper bound for the clock skew tolerance applied to token expiry.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Complete SBSN configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Token and credential handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of an issued bearer token (seconds).
    pub token_ttl_secs: i64,
    /// Grace period past `exp` before a token counts as expired (seconds, <= 60).
    pub clock_skew_secs: i64,
    /// Deadline for a single principal lookup (milliseconds).
    pub lookup_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 3600,
            clock_skew_secs: 0,
            lookup_timeout_ms: 2000,
        }
    }
}

impl AuthConfig {
    /// Reject values that would make token handling unsafe or useless.
    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_secs <= 0 {
            return Err(Error::Config(format!(
                "auth.token_ttl_secs must be positive, got {}",
                self.token_ttl_secs
            )));
        }
        if !(0..=MAX_CLOCK_SKEW_SECS).contains(&self.clock_skew_secs) {
            return Err(Error::Config(format!(
                "auth.clock_skew_secs must be within 0..={MAX_CLOCK_SKEW_SECS}, got {}",
                self.clock_skew_secs
            )));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(Error::Config(
                "auth.lookup_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn lookup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let files: Vec<PathBuf> = global_config_path()
        .filter(|p| p.exists())
        .into_iter()
        .chain(explicit.map(Path::to_path_buf))
        .collect();

    let mut config = load_layered(&files)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.auth.validate()?;

    Ok(config)
}

/// Merge settings files in order, later files winning key by key.
fn load_layered(files: &[PathBuf]) -> Result<Config> {
    let mut merged = serde_json::Value::Object(serde_json::Map::new());
    for path in files {
        merge_json(&mut merged, load_config_file(path)?);
    }
    serde_json::from_value(merged).map_err(|e| Error::Config(format!("Invalid settings: {e}")))
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sbsn").join("settings.json"))
}

/// Default location of the user database.
pub fn database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sbsn").join("sbsn.db"))
}

fn load_config_file(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(addr) = var("SBSN_ADDR").and_then(|v| v.parse().ok()) {
        config.server.addr = addr;
    }
    if let Some(path) = var("SBSN_DATABASE_PATH") {
        config.server.database_path = Some(PathBuf::from(path));
    }
    if let Some(level) = var("SBSN_LOG_LEVEL") {
        config.server.log_level = level;
    }
    if let Some(n) = var("SBSN_TOKEN_TTL_SECS").and_then(|v| v.parse().ok()) {
        config.auth.token_ttl_secs = n;
    }
    if let Some(n) = var("SBSN_CLOCK_SKEW_SECS").and_then(|v| v.parse().ok()) {
        config.auth.clock_skew_secs = n;
    }
    if let Some(n) = var("SBSN_LOOKUP_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.auth.lookup_timeout_ms = n;
    }
}
