//! Loading and validating definition files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::ActionDefinition;
use crate::error::{PlanError, Result};

/// Read and validate a YAML definition file.
pub fn load_definition(path: &Path) -> Result<ActionDefinition> {
    let content = fs::read_to_string(path)?;
    let definition: ActionDefinition =
        serde_yaml::from_str(&content).map_err(|e| PlanError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate(&definition)?;
    debug!(
        "Loaded definition '{}' from {}",
        definition.name,
        path.display()
    );
    Ok(definition)
}

/// Parse and validate a YAML definition held in memory.
pub fn parse_definition(yaml: &str) -> Result<ActionDefinition> {
    let definition: ActionDefinition =
        serde_yaml::from_str(yaml).map_err(|e| PlanError::DefinitionError {
            message: e.to_string(),
        })?;
    validate(&definition)?;
    Ok(definition)
}

/// Names must be unique and every dependency must name a known action.
pub fn validate(definition: &ActionDefinition) -> Result<()> {
    let all = definition.walk();

    let mut names = HashSet::new();
    for action in &all {
        if action.name.trim().is_empty() {
            return Err(PlanError::DefinitionError {
                message: "action names must not be empty".to_string(),
            });
        }
        if !names.insert(action.name.as_str()) {
            return Err(PlanError::DefinitionError {
                message: format!("action '{}' is defined more than once", action.name),
            });
        }
    }

    for action in &all {
        for dep in action.depends_on.iter().chain(&action.finalize_depends_on) {
            if dep == &action.name {
                return Err(PlanError::DefinitionError {
                    message: format!("action '{}' depends on itself", action.name),
                });
            }
            if !names.contains(dep.as_str()) {
                return Err(PlanError::DefinitionError {
                    message: format!(
                        "action '{}' depends on unknown action '{}'",
                        action.name, dep
                    ),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COMMIT: &str = r#"
name: commit
input: { sha: abc123 }
actions:
  - name: ci
  - name: review
    input: { reviewer: Neo }
  - name: merge
    depends_on: [ci, review]
    finalize: true
"#;

    #[test]
    fn parses_nested_definition() {
        let definition = parse_definition(COMMIT).unwrap();
        assert_eq!(definition.name, "commit");
        assert_eq!(definition.actions.len(), 3);
        assert_eq!(definition.actions[2].depends_on, vec!["ci", "review"]);
        assert!(definition.actions[2].finalize);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = "name: a\nactions:\n  - name: b\n  - name: b\n";
        let err = parse_definition(yaml).unwrap_err();
        assert!(matches!(err, PlanError::DefinitionError { message } if message.contains("'b'")));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let yaml = "name: a\nactions:\n  - name: b\n    depends_on: [c]\n";
        let err = parse_definition(yaml).unwrap_err();
        assert!(matches!(err, PlanError::DefinitionError { message } if message.contains("unknown action 'c'")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse_definition("name: a\nparallel: true\n").is_err());
    }

    #[test]
    fn file_parse_errors_name_the_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yml");
        fs::write(&path, "name: [unclosed").unwrap();

        let err = load_definition(&path).unwrap_err();
        assert!(matches!(err, PlanError::ConfigParseError { path: p, .. } if p == path));
    }

    #[test]
    fn loads_definition_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("commit.yml");
        fs::write(&path, COMMIT).unwrap();

        assert_eq!(load_definition(&path).unwrap().name, "commit");
    }
}
