//! Pipeline and reconciler configuration.
//!
//! Configuration is a JSON tree so unknown keys survive untouched. User
//! overrides (YAML or JSON) are schema-checked, then deep-merged over a
//! freshly built set of defaults. After construction it is read-only.

mod schema;

pub use schema::{validate_config_schema, SchemaError};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::LayerName;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config failed schema validation: {}", .0.join("; "))]
    SchemaError(Vec<String>),
}

/// Effective settings of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSettings {
    pub enabled: bool,
    pub blocking: bool,
}

/// Built-in defaults. Constructed per call so no two configs share a tree.
pub fn default_config() -> Value {
    json!({
        "layers": {
            "template_compliance": { "enabled": true, "blocking": true },
            "instruction_alignment": { "enabled": true, "blocking": true },
            "hallucination_detection": { "enabled": true, "blocking": true },
            "reality_anchor": { "enabled": true, "blocking": false }
        },
        "evidence_collection": {
            "save_screenshots": true,
            "save_reports": true,
            "retention_days": 30
        },
        "strict_mode": false,
        "tool_discovery": {
            "auto_scan": true,
            "mcp_config_paths": [
                "~/.config/claude-desktop/claude_desktop_config.json",
                "./mcp_config.json",
                "./.claude/mcp_tools.json"
            ]
        },
        "tool_validation": {
            "require_tool_usage_for_claims": true,
            "block_fake_tool_claims": true,
            "suggest_missing_tools": true
        }
    })
}

/// Deep-merge `overrides` over `base`, returning a new tree.
///
/// Objects merge key by key; any other override value replaces the base leaf.
pub fn merge(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let next = match merged.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

/// Read-only configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    raw: Value,
}

impl Config {
    /// The built-in defaults.
    pub fn defaults() -> Self {
        Self {
            raw: default_config(),
        }
    }

    /// Defaults with `overrides` merged on top.
    pub fn from_value(overrides: &Value) -> Result<Self, ConfigError> {
        Self::defaults().with_overrides(overrides)
    }

    /// Parse an override document from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Parse an override document from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Load an override file; `.yaml`/`.yml` is YAML, anything else JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    /// Load configuration, never failing.
    ///
    /// A missing path means defaults. A file that cannot be read, parsed or
    /// schema-validated is logged and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::defaults();
        };

        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Self::defaults();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unusable config file");
                Self::defaults()
            }
        }
    }

    /// A new config with `overrides` merged over this one.
    ///
    /// `null` values (an empty YAML section, for one) count as absent.
    pub fn with_overrides(&self, overrides: &Value) -> Result<Self, ConfigError> {
        let overrides = strip_nulls(overrides);
        validate_config_schema(&overrides).map_err(ConfigError::SchemaError)?;
        Ok(Self {
            raw: merge(&self.raw, &overrides),
        })
    }

    /// The full configuration tree, unknown keys included.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// The full configuration tree as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&self.raw)?)
    }

    /// Write the defaults as YAML to `path` unless a file is already there.
    ///
    /// Returns `true` when the file was created. Parent directories are
    /// created as needed.
    pub fn write_defaults(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            debug!(path = %path.display(), "config file exists, leaving it alone");
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::defaults().to_yaml()?)?;
        debug!(path = %path.display(), "wrote default config");
        Ok(true)
    }

    /// Enabled/blocking flags for a layer.
    pub fn layer(&self, name: LayerName) -> LayerSettings {
        let key = name.as_str();
        let enabled = self.bool_at(&format!("/layers/{}/enabled", key));
        let blocking = self.bool_at(&format!("/layers/{}/blocking", key));
        LayerSettings { enabled, blocking }
    }

    /// Reserved; carried through to reports.
    pub fn strict_mode(&self) -> bool {
        self.bool_at("/strict_mode")
    }

    pub fn auto_scan(&self) -> bool {
        self.bool_at("/tool_discovery/auto_scan")
    }

    /// Candidate tool-configuration files, as written (unexpanded).
    pub fn discovery_paths(&self) -> Vec<String> {
        let paths = self
            .raw
            .pointer("/tool_discovery/mcp_config_paths")
            .and_then(Value::as_array);

        match paths {
            Some(paths) => paths
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn require_tool_usage_for_claims(&self) -> bool {
        self.bool_at("/tool_validation/require_tool_usage_for_claims")
    }

    pub fn block_fake_tool_claims(&self) -> bool {
        self.bool_at("/tool_validation/block_fake_tool_claims")
    }

    pub fn suggest_missing_tools(&self) -> bool {
        self.bool_at("/tool_validation/suggest_missing_tools")
    }

    /// Boolean leaf, falling back to the built-in default for that leaf.
    fn bool_at(&self, pointer: &str) -> bool {
        self.raw
            .pointer(pointer)
            .and_then(Value::as_bool)
            .or_else(|| default_config().pointer(pointer).and_then(Value::as_bool))
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

/// An empty YAML document parses as null; treat it as "no overrides".
/// `~/.claude-guardrail/config.yaml`, or `None` without a home directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude-guardrail").join("config.yaml"))
}

/// Drop `null` members at every depth; a `null` document becomes `{}`.
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(
            config.layer(LayerName::TemplateCompliance),
            LayerSettings { enabled: true, blocking: true }
        );
        assert_eq!(
            config.layer(LayerName::RealityAnchor),
            LayerSettings { enabled: true, blocking: false }
        );
        assert!(!config.strict_mode());
        assert!(config.auto_scan());
        assert_eq!(config.discovery_paths().len(), 3);
    }

    #[test]
    fn test_merge_override_wins_per_leaf() {
        let base = json!({ "a": { "x": 1, "y": 2 }, "b": true });
        let overrides = json!({ "a": { "y": 3, "z": 4 }, "c": "new" });

        let merged = merge(&base, &overrides);

        assert_eq!(merged, json!({ "a": { "x": 1, "y": 3, "z": 4 }, "b": true, "c": "new" }));
        // Inputs untouched
        assert_eq!(base, json!({ "a": { "x": 1, "y": 2 }, "b": true }));
    }

    #[test]
    fn test_merge_non_object_replaces() {
        let merged = merge(&json!({ "a": { "x": 1 } }), &json!({ "a": [1, 2] }));
        assert_eq!(merged, json!({ "a": [1, 2] }));
    }

    #[test]
    fn test_yaml_override_keeps_unknown_keys() {
        let config = Config::from_yaml(
            r#"
layers:
  reality_anchor:
    blocking: true
visual_validation:
  dev_server_url: "http://localhost:3000"
"#,
        )
        .unwrap();

        assert_eq!(
            config.layer(LayerName::RealityAnchor),
            LayerSettings { enabled: true, blocking: true }
        );
        assert_eq!(
            config.as_value()["visual_validation"]["dev_server_url"],
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_instances_do_not_alias_defaults() {
        let disabled = Config::from_json(
            r#"{"layers": {"template_compliance": {"enabled": false}}}"#,
        )
        .unwrap();
        let fresh = Config::defaults();

        assert!(!disabled.layer(LayerName::TemplateCompliance).enabled);
        assert!(fresh.layer(LayerName::TemplateCompliance).enabled);
    }

    #[test]
    fn test_schema_violation_is_rejected() {
        let result = Config::from_json(r#"{"strict_mode": "sometimes"}"#);
        assert!(matches!(result, Err(ConfigError::SchemaError(_))));
    }

    #[test]
    fn test_empty_yaml_is_defaults() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::defaults());
    }

    #[test]
    fn test_load_never_fails() {
        let dir = TempDir::new().unwrap();

        assert_eq!(Config::load(None), Config::defaults());
        assert_eq!(
            Config::load(Some(&dir.path().join("missing.yaml"))),
            Config::defaults()
        );

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(Config::load(Some(&broken)), Config::defaults());

        let good = dir.path().join("config.yaml");
        fs::write(&good, "strict_mode: true\n").unwrap();
        assert!(Config::load(Some(&good)).strict_mode());
    }

    #[test]
    fn test_write_defaults_creates_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude-guardrail").join("config.yaml");

        assert!(Config::write_defaults(&path).unwrap());
        assert_eq!(Config::from_file(&path).unwrap(), Config::defaults());

        fs::write(&path, "strict_mode: true\n").unwrap();
        assert!(!Config::write_defaults(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "strict_mode: true\n");
    }

    #[test]
    fn test_empty_yaml_section_is_absent() {
        let config = Config::from_yaml("evidence_collection:\nstrict_mode: true\n").unwrap();

        assert!(config.strict_mode());
        assert_eq!(
            config.as_value()["evidence_collection"],
            Config::defaults().as_value()["evidence_collection"]
        );
    }

    #[test]
    fn test_null_nested_key_keeps_default() {
        let config = Config::from_yaml("layers:\n  reality_anchor:\n    blocking:\n").unwrap();
        assert_eq!(
            config.layer(LayerName::RealityAnchor),
            LayerSettings { enabled: true, blocking: false }
        );
    }

    #[test]
    fn test_load_keeps_overrides_beside_empty_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "tool_discovery:\nstrict_mode: true\n").unwrap();

        let config = Config::load(Some(&path));
        assert!(config.strict_mode());
        assert!(config.auto_scan());
    }
}
