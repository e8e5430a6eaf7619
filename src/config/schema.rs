//! Settings file schema.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::plan::PlanResult;

/// Settings read from `planflow.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding persisted plans, relative to the project root.
    pub store_dir: PathBuf,

    /// Plans per page when listing.
    pub per_page: usize,

    /// Results listed when no filter is given.
    pub default_result_filter: Vec<PlanResult>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".planflow"),
            per_page: 10,
            default_result_filter: PlanResult::ALL.to_vec(),
        }
    }
}

impl Settings {
    /// The store directory, resolved against `project_root` when relative.
    pub fn store_path(&self, project_root: &Path) -> PathBuf {
        if self.store_dir.is_absolute() {
            self.store_dir.clone()
        } else {
            project_root.join(&self.store_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store_dir, PathBuf::from(".planflow"));
        assert_eq!(settings.per_page, 10);
        assert_eq!(settings.default_result_filter.len(), 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings: Settings = serde_yaml::from_str("per_page: 25").unwrap();
        assert_eq!(settings.per_page, 25);
        assert_eq!(settings.store_dir, PathBuf::from(".planflow"));
    }

    #[test]
    fn result_filter_uses_lowercase_names() {
        let settings: Settings =
            serde_yaml::from_str("default_result_filter: [error, pending]").unwrap();
        assert_eq!(
            settings.default_result_filter,
            vec![PlanResult::Error, PlanResult::Pending]
        );
    }

    #[test]
    fn store_path_resolves_relative_dirs() {
        let settings = Settings::default();
        assert_eq!(
            settings.store_path(Path::new("/work")),
            PathBuf::from("/work/.planflow")
        );
    }
}
