//! Settings management: optional TOML file with sensible defaults.
//!
//! Settings file location: `lightdeck.toml` in the working directory, or the
//! path named by the `LIGHTDECK_CONFIG` environment variable.
//! Falls back to compiled-in defaults if the file is missing or malformed.
//!
//! The light registry itself (`lights_config.json`) is a separate JSON file
//! owned by `lightdeck-control`; this file only tunes how it is found and how
//! devices are queried.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "LIGHTDECK_CONFIG";

/// Default settings file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "lightdeck.toml";

/// Default light registry file name, resolved against the working directory.
pub const REGISTRY_FILE: &str = "lights_config.json";

/// Full path to the settings file.
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(CONFIG_FILE),
    }
}

/// Application settings with defaults for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the JSON light registry.
    pub registry_path: String,

    /// Milliseconds to wait for a device reply before retrying.
    pub timeout_ms: u64,

    /// Send attempts per device request.
    pub attempts: u32,

    /// Debug-level logging for CLI commands.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_path: REGISTRY_FILE.to_string(),
            timeout_ms: 1000,
            attempts: 2,
            verbose: false,
        }
    }
}

impl Settings {
    /// Load settings from [`config_path`], falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load settings from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Settings>(&contents) {
                Ok(cfg) => {
                    info!("Settings loaded from {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!(
                        "Settings parse error in {}: {}, using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write settings to [`config_path`].
    pub fn write(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.write_to(&config_path())
    }

    /// Write settings to an explicit path (creates the parent directory if needed).
    pub fn write_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(path, self.to_toml_commented())?;
        info!("Settings written to {}", path.display());
        Ok(())
    }

    /// Registry path as a `PathBuf`.
    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.registry_path)
    }

    /// Serialize settings to a TOML string with helpful comments.
    pub fn to_toml_commented(&self) -> String {
        format!(
            r##"# lightdeck settings
# Location: ./lightdeck.toml (override with LIGHTDECK_CONFIG)

# ─── Registry ────────────────────────────────────────────────────────
# JSON file holding the known lights (id -> mac_addr / ip_addr).
registry_path = "{registry_path}"

# ─── Network ─────────────────────────────────────────────────────────
# How long to wait for a bulb to answer a single request (ms).
timeout_ms = {timeout_ms}

# How many times a request is sent before the bulb counts as unreachable.
attempts = {attempts}

# ─── Debug ───────────────────────────────────────────────────────────
# Log every device request (CLI mode only).
verbose = {verbose}
"##,
            registry_path = escape_toml_string(&self.registry_path),
            timeout_ms = self.timeout_ms,
            attempts = self.attempts,
            verbose = self.verbose,
        )
    }
}

/// Escape a string for safe inclusion inside a TOML basic string (`"..."`).
fn escape_toml_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
