//! JSON files on disk.
//!
//! Layout under the store root:
//!
//! ```text
//! plans/<plan_id>/plan.json
//! plans/<plan_id>/steps/<step_id>.json
//! plans/<plan_id>/actions/<action_id>.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::trace;

use super::PersistenceAdapter;
use crate::action::ActionId;
use crate::error::Result;
use crate::steps::StepId;

/// Stores every record as its own JSON file.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    root: PathBuf,
}

impl FileAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plans_dir(&self) -> PathBuf {
        self.root.join("plans")
    }

    fn plan_dir(&self, plan_id: &str) -> Result<PathBuf> {
        let valid = !plan_id.is_empty()
            && !plan_id.contains(['/', '\\'])
            && plan_id != "."
            && !plan_id.contains("..");
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid plan id '{}'", plan_id),
            )
            .into());
        }
        Ok(self.plans_dir().join(plan_id))
    }

    fn read(path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write to a temp file, then rename over the target, so a crash never
    /// leaves a partially written record behind.
    fn write_atomic(path: &Path, value: &Value) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(value)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;

        trace!("Wrote {}", path.display());
        Ok(())
    }
}

impl PersistenceAdapter for FileAdapter {
    fn save_execution_plan(&mut self, plan_id: &str, plan: &Value) -> Result<()> {
        Self::write_atomic(&self.plan_dir(plan_id)?.join("plan.json"), plan)
    }

    fn load_execution_plan(&self, plan_id: &str) -> Result<Option<Value>> {
        Self::read(&self.plan_dir(plan_id)?.join("plan.json"))
    }

    fn list_execution_plans(&self) -> Result<Vec<String>> {
        let dir = self.plans_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.path().join("plan.json").is_file() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn save_step(&mut self, plan_id: &str, step_id: StepId, step: &Value) -> Result<()> {
        let path = self
            .plan_dir(plan_id)?
            .join("steps")
            .join(format!("{}.json", step_id));
        Self::write_atomic(&path, step)
    }

    fn load_step(&self, plan_id: &str, step_id: StepId) -> Result<Option<Value>> {
        Self::read(
            &self
                .plan_dir(plan_id)?
                .join("steps")
                .join(format!("{}.json", step_id)),
        )
    }

    fn save_action(&mut self, plan_id: &str, action_id: ActionId, action: &Value) -> Result<()> {
        let path = self
            .plan_dir(plan_id)?
            .join("actions")
            .join(format!("{}.json", action_id));
        Self::write_atomic(&path, action)
    }

    fn load_action(&self, plan_id: &str, action_id: ActionId) -> Result<Option<Value>> {
        Self::read(
            &self
                .plan_dir(plan_id)?
                .join("actions")
                .join(format!("{}.json", action_id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn writes_the_documented_layout() {
        let temp = TempDir::new().unwrap();
        let mut adapter = FileAdapter::new(temp.path());

        adapter.save_execution_plan("p1", &json!({"id": "p1"})).unwrap();
        adapter.save_step("p1", 4, &json!({"id": 4})).unwrap();
        adapter.save_action("p1", 2, &json!({"id": 2})).unwrap();

        let plan_dir = temp.path().join("plans").join("p1");
        assert!(plan_dir.join("plan.json").is_file());
        assert!(plan_dir.join("steps").join("4.json").is_file());
        assert!(plan_dir.join("actions").join("2.json").is_file());
        assert!(!plan_dir.join("plan.json.tmp").exists());
    }

    #[test]
    fn reads_back_what_was_written() {
        let temp = TempDir::new().unwrap();
        let mut adapter = FileAdapter::new(temp.path());
        adapter.save_step("p1", 4, &json!({"state": "running"})).unwrap();

        assert_eq!(
            adapter.load_step("p1", 4).unwrap(),
            Some(json!({"state": "running"}))
        );
        assert_eq!(adapter.load_step("p1", 5).unwrap(), None);
        assert_eq!(adapter.load_execution_plan("p2").unwrap(), None);
    }

    #[test]
    fn lists_only_complete_plans() {
        let temp = TempDir::new().unwrap();
        let mut adapter = FileAdapter::new(temp.path());
        assert!(adapter.list_execution_plans().unwrap().is_empty());

        adapter.save_execution_plan("b", &json!({})).unwrap();
        adapter.save_execution_plan("a", &json!({})).unwrap();
        adapter.save_step("orphan", 1, &json!({})).unwrap();

        assert_eq!(adapter.list_execution_plans().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn rejects_path_like_plan_ids() {
        let temp = TempDir::new().unwrap();
        let mut adapter = FileAdapter::new(temp.path());

        for id in ["", "..", "../escape", "a/b"] {
            assert!(matches!(
                adapter.save_execution_plan(id, &json!({})),
                Err(PlanError::Io(_))
            ));
        }
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let temp = TempDir::new().unwrap();
        let adapter = FileAdapter::new(temp.path());
        let dir = temp.path().join("plans").join("p1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("plan.json"), "{ not json").unwrap();

        assert!(matches!(
            adapter.load_execution_plan("p1"),
            Err(PlanError::Serialization(_))
        ));
    }
}
