use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matcher::MatchConfig;
use crate::theme::ThemeColors;

const APP_DIR: &str = "tabz";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "tabz.log";

/// Optional, read-only settings. Every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PickerConfig {
    pub(crate) matcher: MatchConfig,
    pub(crate) colors: ThemeColors,
    pub(crate) placeholder: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            matcher: MatchConfig::default(),
            colors: ThemeColors::default(),
            placeholder: "Search open tabs...".to_string(),
        }
    }
}

pub(crate) fn app_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}

pub(crate) fn config_file_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub(crate) fn log_file_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join(LOG_FILE))
}

pub(crate) fn load_config() -> PickerConfig {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => PickerConfig::default(),
    }
}

pub(crate) fn load_config_from(path: &Path) -> PickerConfig {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return PickerConfig::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read config, using defaults");
            return PickerConfig::default();
        }
    };
    match serde_json::from_str::<PickerConfig>(&raw) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config json, using defaults");
            PickerConfig::default()
        }
    }
}
