//! Settings discovery and loading.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults
//! 2. `planflow.yml` in the project root, or the file given with `--config`
//! 3. The `PLANFLOW_STORE_DIR` environment variable
//!
//! The `--store` flag is applied by the CLI on top of all of these.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Settings;
use crate::error::{PlanError, Result};

/// Default settings file name, looked up in the project root.
pub const SETTINGS_FILE: &str = "planflow.yml";

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "PLANFLOW_STORE_DIR";

/// Load settings for `project_root`.
///
/// An explicit path must exist; the default file is optional.
pub fn load_settings(project_root: &Path, explicit: Option<&Path>) -> Result<Settings> {
    let settings = match explicit {
        Some(path) => load_settings_file(path)?,
        None => {
            let path = project_root.join(SETTINGS_FILE);
            if path.exists() {
                load_settings_file(&path)?
            } else {
                Settings::default()
            }
        }
    };

    Ok(apply_env(settings, |key| std::env::var(key).ok()))
}

/// Read a single settings file.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlanError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PlanError::Io(e)
        }
    })?;

    debug!("Loading settings from {}", path.display());
    parse_settings(&content, path)
}

/// Parse YAML settings; `source_path` is used for error reporting.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    // An empty file means "all defaults"
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(content).map_err(|e| PlanError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(STORE_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
        debug!("Store directory overridden by {}", STORE_DIR_ENV);
        settings.store_dir = PathBuf::from(dir);
    }
    settings
}
