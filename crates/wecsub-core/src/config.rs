//! Configuration resolution for wecsub.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (settings.json in the per-user config directory)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete wecsub configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Program used for subscription management on the target host.
    pub wecutil_path: String,
    /// PowerShell used for remoting and account lookups.
    pub powershell_path: String,
    /// Computer targeted when neither `--computer` nor `--session` is given.
    pub default_computer: Option<String>,
    pub log_level: String,
    /// Named remoting profiles, selected with `--session`.
    pub sessions: HashMap<String, SessionProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wecutil_path: "wecutil.exe".to_string(),
            powershell_path: "powershell.exe".to_string(),
            default_computer: None,
            log_level: "info".to_string(),
            sessions: HashMap::new(),
        }
    }
}

/// WinRM connection settings for one remote collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionProfile {
    pub computer: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub use_ssl: bool,
    /// `Invoke-Command -Authentication` value (e.g. `Kerberos`, `Negotiate`).
    #[serde(default)]
    pub authentication: Option<String>,
    /// Account used for `-Credential`; the password is never stored.
    #[serde(default)]
    pub username: Option<String>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    match explicit {
        Some(path) => {
            let file = load_config_file(path)?;
            merge_config(&mut config, file);
        }
        None => {
            if let Some(global_path) = global_config_path()
                && global_path.exists()
            {
                let global = load_config_file(&global_path)?;
                merge_config(&mut config, global);
            }
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".wecsub").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/wecsub/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("wecsub").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

impl Config {
    /// Look up a session profile by name.
    pub fn session(&self, name: &str) -> Result<&SessionProfile> {
        self.sessions.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
            known.sort_unstable();
            Error::Config(format!(
                "unknown session '{name}' (configured: {})",
                if known.is_empty() { "none".to_string() } else { known.join(", ") }
            ))
        })
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.wecutil_path = overlay.wecutil_path;
    base.powershell_path = overlay.powershell_path;
    if overlay.default_computer.is_some() {
        base.default_computer = overlay.default_computer;
    }
    base.log_level = overlay.log_level;
    base.sessions.extend(overlay.sessions);
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("WECSUB_WECUTIL") {
        config.wecutil_path = val;
    }
    if let Some(val) = var("WECSUB_POWERSHELL") {
        config.powershell_path = val;
    }
    if let Some(val) = var("WECSUB_COMPUTER").filter(|v| !v.is_empty()) {
        config.default_computer = Some(val);
    }
    if let Some(val) = var("WECSUB_LOG_LEVEL") {
        config.log_level = val;
    }
}
