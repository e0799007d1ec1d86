//! Activity configuration model and template/schema loading.
//!
//! The configuration is the one mutable entity of the whole program: loaded
//! from the template once at startup and replaced wholesale by each
//! extraction turn. Every field carries a serde default so a partial model
//! response still deserializes.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Resource visibility: phase name → groups that can see the resource
/// during that phase.
pub type Visibility = BTreeMap<String, Vec<String>>;

/// The activity configuration being co-designed with the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub project_name: String,
    pub phases: Vec<String>,
    pub groups: Vec<String>,
    pub boards: Vec<Board>,
    pub accounts: Accounts,
}

/// A named collection of resources shown to specific groups during
/// specific phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    pub board_name: String,
    pub buckets: Vec<String>,
    pub canvas: Visibility,
    pub bucket_view: Visibility,
    pub monitor_view: Visibility,
    pub todo: Visibility,
    pub workspace: Visibility,
}

/// Accounts by category, each mapping an account name to its record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accounts {
    pub teachers: BTreeMap<String, Account>,
    pub students: BTreeMap<String, Account>,
    pub devices: BTreeMap<String, Account>,
}

/// Classroom placement and group membership for one account.
///
/// Coordinates are relative to the classroom rectangle; the renderer clamps
/// them into bounds, so out-of-range and negative values are legal here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub x: i32,
    pub y: i32,
    pub group: Option<String>,
}

impl ActivityConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file is missing or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration JSON: {}", path.display()))
    }

    /// Pretty-printed JSON for console output and model prompts.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Load the configuration schema as a raw JSON value.
///
/// The schema is never applied locally; it is embedded verbatim in the
/// feedback prompt.
pub fn load_schema(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid schema JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp_json(content: &str) -> (tempfile::NamedTempFile, PathBuf) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let path = file.path().to_path_buf();
        (file, path)
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config: ActivityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ActivityConfig::default());
        assert!(config.project_name.is_empty());
        assert!(config.phases.is_empty());
        assert!(config.boards.is_empty());
    }

    #[test]
    fn partial_board_fills_missing_resources() {
        let json = r#"{
            "project_name": "Awesome Project",
            "phases": ["Planning", "Development"],
            "boards": [{"board_name": "Development Board", "canvas": {"Planning": ["Managers"]}}]
        }"#;
        let config: ActivityConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.boards.len(), 1);
        let board = &config.boards[0];
        assert_eq!(board.board_name, "Development Board");
        assert_eq!(board.canvas["Planning"], vec!["Managers"]);
        assert!(board.buckets.is_empty());
        assert!(board.todo.is_empty());
        assert!(board.workspace.is_empty());
    }

    #[test]
    fn accounts_deserialize_with_locations() {
        let json = r#"{
            "accounts": {
                "students": {
                    "amy": {"x": 4, "y": 2, "group": "Red"},
                    "ben": {"x": -1, "y": 90}
                }
            }
        }"#;
        let config: ActivityConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.accounts.students.len(), 2);
        assert_eq!(config.accounts.students["amy"].group.as_deref(), Some("Red"));
        assert_eq!(config.accounts.students["ben"].x, -1);
        assert_eq!(config.accounts.students["ben"].group, None);
        assert!(config.accounts.teachers.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"project_name": "P", "surprise": true, "phases": ["One"]}"#;
        let config: ActivityConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.project_name, "P");
        assert_eq!(config.phases, vec!["One"]);
    }

    #[test]
    fn load_round_trips_template_shape() {
        let (_file, path) = write_temp_json(
            r#"{"project_name": "", "phases": [], "groups": [], "boards": [],
                "accounts": {"teachers": {}, "students": {}, "devices": {}}}"#,
        );
        let config = ActivityConfig::load(&path).unwrap();
        assert_eq!(config, ActivityConfig::default());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let result = ActivityConfig::load(Path::new("/nonexistent/activity.json"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_json_is_an_error() {
        let (_file, path) = write_temp_json("{ not json }");
        assert!(ActivityConfig::load(&path).is_err());
    }

    #[test]
    fn schema_loads_as_raw_value() {
        let (_file, path) = write_temp_json(r#"{"type": "object", "properties": {}}"#);
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn pretty_output_is_stable_json() {
        let config = ActivityConfig { project_name: "P".into(), ..Default::default() };
        let reparsed: ActivityConfig = serde_json::from_str(&config.pretty()).unwrap();
        assert_eq!(reparsed, config);
    }
}
