//! Settings for the planflow command line.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//!
//! # Example
//!
//! ```
//! use planflow::config::load_settings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("planflow.yml"), "per_page: 5").unwrap();
//!
//! let settings = load_settings(temp.path(), None).unwrap();
//! assert_eq!(settings.per_page, 5);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    apply_env, load_settings, load_settings_file, parse_settings, SETTINGS_FILE, STORE_DIR_ENV,
};
pub use schema::Settings;
