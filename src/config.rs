//! User configuration (`config.toml`).
//!
//! Every key is optional. A missing file means defaults; a file that fails
//! to load produces a warning and defaults are used.

use crate::error::Result;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;

/// Quiescence window bounds for the commit debounce, in milliseconds.
pub const DEBOUNCE_MIN_MS: u64 = 300;
pub const DEBOUNCE_MAX_MS: u64 = 500;
pub const DEBOUNCE_DEFAULT_MS: u64 = 400;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub debounce_ms: u64,
    pub log_file: Option<PathBuf>,
    pub layout: Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_DEFAULT_MS,
            log_file: None,
            layout: Layout::default(),
        }
    }
}

/// Grid geometry in terminal cells, used for drawing and auto-scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub row_height: u16,
    pub column_width: u16,
    pub row_label_width: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            row_height: 1,
            column_width: 12,
            row_label_width: 5,
        }
    }
}

impl Config {
    /// Debounce window, clamped to the supported range.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.clamp(DEBOUNCE_MIN_MS, DEBOUNCE_MAX_MS))
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    config.layout.row_height = config.layout.row_height.max(1);
    config.layout.column_width = config.layout.column_width.max(1);
    Ok(config)
}

/// Load the config from `explicit` or the user config dir.
///
/// Returns the config and any warnings to show the user.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            (Config::default(), warnings)
        }
        Ok(_) => match std::fs::read_to_string(&path)
            .map_err(Into::into)
            .and_then(|content| parse_config(&content))
        {
            Ok(config) => {
                if config.debounce_ms != config.debounce().as_millis() as u64 {
                    warnings.push(format!(
                        "debounce_ms = {} is outside {}..={}; using {}",
                        config.debounce_ms,
                        DEBOUNCE_MIN_MS,
                        DEBOUNCE_MAX_MS,
                        config.debounce().as_millis()
                    ));
                }
                (config, warnings)
            }
            Err(err) => {
                warnings.push(format!("Failed to load {}: {}", path.display(), err));
                (Config::default(), warnings)
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            (Config::default(), warnings)
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetsync")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
