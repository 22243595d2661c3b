//! Tool registry: a built-in baseline plus discovered tool-server configs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Errors from reading a tool-configuration file.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read tool config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse tool config JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed tool config: {0}")]
    ShapeError(String),
}

/// Envelope keys that hold a server map, in lookup order.
const SERVER_MAP_KEYS: &[&str] = &["mcpServers", "servers"];

/// Static description of one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub required_params: Vec<String>,

    #[serde(default)]
    pub optional_params: Vec<String>,

    #[serde(default)]
    pub usage_examples: Vec<String>,

    /// Known ways assistants misuse or misreport this tool
    #[serde(default)]
    pub common_mistakes: Vec<String>,
}

impl ToolDescriptor {
    /// A descriptor with only a name and description.
    pub fn named(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            usage_examples: Vec::new(),
            common_mistakes: Vec::new(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The tools every registry starts with.
pub fn baseline_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "filesystem".to_string(),
            description: "Read, write, and manage files and directories".to_string(),
            required_params: strings(&["path"]),
            optional_params: strings(&["encoding", "create_parents"]),
            usage_examples: strings(&[
                "Read file: filesystem.read_file(path='src/app/page.tsx')",
                "Write file: filesystem.write_file(path='output.txt', content='data')",
            ]),
            common_mistakes: strings(&[
                "Claiming to modify files without using filesystem tool",
                "Reading files with generic descriptions instead of actual content",
            ]),
        },
        ToolDescriptor {
            name: "web_search".to_string(),
            description: "Search the web for current information".to_string(),
            required_params: strings(&["query"]),
            optional_params: strings(&["num_results"]),
            usage_examples: strings(&["web_search.search(query='Next.js 14 features')"]),
            common_mistakes: strings(&[
                "Claiming to search without using the tool",
                "Providing outdated information when search tool is available",
            ]),
        },
        ToolDescriptor {
            name: "ken_you_remember".to_string(),
            description: "Store and retrieve persistent memory".to_string(),
            required_params: strings(&["content"]),
            optional_params: strings(&["tags", "context"]),
            usage_examples: strings(&[
                "ken_you_remember.remember(content='User prefers React hooks')",
            ]),
            common_mistakes: strings(&[
                "Forgetting user preferences when memory tool is available",
            ]),
        },
    ]
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Immutable set of known tools, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// A registry holding exactly the given tools (later entries win).
    pub fn from_tools(tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let tools = tools.into_iter().map(|t| (t.name.clone(), t)).collect();
        Self { tools }
    }

    /// The built-in baseline only.
    pub fn baseline() -> Self {
        Self::from_tools(baseline_tools())
    }

    /// Baseline plus whatever the configured discovery paths yield.
    ///
    /// With `tool_discovery.auto_scan` off, no files are read.
    pub fn discover(config: &Config) -> Self {
        if !config.auto_scan() {
            debug!("tool auto-scan disabled, using baseline registry");
            return Self::baseline();
        }

        let paths: Vec<PathBuf> = config
            .discovery_paths()
            .iter()
            .map(|p| expand_home(p))
            .collect();
        Self::baseline().with_discovered(&paths)
    }

    /// Add tools from each existing file in `paths`.
    ///
    /// Missing files are skipped silently. Malformed files are logged and
    /// skipped. Discovered tools override baseline tools of the same name.
    pub fn with_discovered(mut self, paths: &[PathBuf]) -> Self {
        for path in paths {
            if !path.is_file() {
                continue;
            }

            match Self::parse_config_file(path) {
                Ok(found) => {
                    debug!(path = %path.display(), count = found.len(), "discovered tools");
                    for tool in found {
                        self.tools.insert(tool.name.clone(), tool);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not parse tool config");
                }
            }
        }
        self
    }

    /// Tools declared in one configuration file.
    pub fn parse_config_file(path: impl AsRef<Path>) -> Result<Vec<ToolDescriptor>, RegistryError> {
        let contents = fs::read_to_string(path)?;
        Self::parse_config_str(&contents)
    }

    /// Tools declared in a configuration document.
    ///
    /// A document with no server map declares no tools.
    pub fn parse_config_str(contents: &str) -> Result<Vec<ToolDescriptor>, RegistryError> {
        let document: Value = serde_json::from_str(contents)?;
        let Some(root) = document.as_object() else {
            return Err(RegistryError::ShapeError(
                "top level is not an object".to_string(),
            ));
        };

        let Some((key, servers)) = SERVER_MAP_KEYS
            .iter()
            .find_map(|key| root.get(*key).map(|servers| (*key, servers)))
        else {
            return Ok(Vec::new());
        };

        let servers = servers
            .as_object()
            .ok_or_else(|| RegistryError::ShapeError(format!("'{}' is not an object", key)))?;

        let tools = servers
            .iter()
            .map(|(name, entry)| {
                let description = entry
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("MCP Server: {}", name));
                ToolDescriptor::named(name.clone(), description)
            })
            .collect();

        Ok(tools)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_baseline_contents() {
        let registry = ToolRegistry::baseline();
        assert_eq!(registry.names(), vec!["filesystem", "ken_you_remember", "web_search"]);
        assert_eq!(registry.get("filesystem").unwrap().required_params, vec!["path"]);
    }

    #[test]
    fn test_parse_desktop_format() {
        let tools = ToolRegistry::parse_config_str(
            r#"{"mcpServers": {
                "github": {"command": "npx", "description": "GitHub access"},
                "postgres": {"command": "pg"}
            }}"#,
        )
        .unwrap();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "github");
        assert_eq!(tools[0].description, "GitHub access");
        assert_eq!(tools[1].description, "MCP Server: postgres");
    }

    #[test]
    fn test_parse_plain_servers_key() {
        let tools = ToolRegistry::parse_config_str(r#"{"servers": {"linear": {}}}"#).unwrap();
        assert_eq!(tools[0].name, "linear");
    }

    #[test]
    fn test_document_without_servers_declares_nothing() {
        assert!(ToolRegistry::parse_config_str(r#"{"theme": "dark"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        assert!(matches!(
            ToolRegistry::parse_config_str("{ nope"),
            Err(RegistryError::JsonError(_))
        ));
        assert!(matches!(
            ToolRegistry::parse_config_str(r#"{"mcpServers": []}"#),
            Err(RegistryError::ShapeError(_))
        ));
    }

    #[test]
    fn test_discovery_skips_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("mcp_config.json");
        let bad = dir.path().join("broken.json");
        fs::write(&good, json!({"mcpServers": {"github": {}}}).to_string()).unwrap();
        fs::write(&bad, "{{{{").unwrap();

        let registry = ToolRegistry::baseline().with_discovered(&[
            dir.path().join("missing.json"),
            bad,
            good,
        ]);

        assert!(registry.contains("github"));
        assert!(registry.contains("filesystem"));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_discovered_tool_overrides_baseline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        fs::write(
            &path,
            json!({"servers": {"filesystem": {"description": "Sandboxed files"}}}).to_string(),
        )
        .unwrap();

        let registry = ToolRegistry::baseline().with_discovered(&[path]);
        assert_eq!(registry.get("filesystem").unwrap().description, "Sandboxed files");
    }

    #[test]
    fn test_auto_scan_off_reads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tools.json");
        fs::write(&path, json!({"servers": {"github": {}}}).to_string()).unwrap();

        let config = Config::from_value(&json!({
            "tool_discovery": {
                "auto_scan": false,
                "mcp_config_paths": [path.to_string_lossy()]
            }
        }))
        .unwrap();

        assert_eq!(ToolRegistry::discover(&config), ToolRegistry::baseline());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("./mcp_config.json"), PathBuf::from("./mcp_config.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.claude/x.json"), home.join(".claude/x.json"));
        }
    }
}
