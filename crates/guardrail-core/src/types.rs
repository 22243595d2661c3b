//! Core data types shared across the engine.
//!
//! Everything here is plain data: produced once by a check, never mutated
//! afterwards, and serializable so the CLI (or any other caller) can render it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four validation layers, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerName {
    TemplateCompliance,
    InstructionAlignment,
    HallucinationDetection,
    RealityAnchor,
}

impl LayerName {
    /// All layers in the order the pipeline runs them.
    pub const ALL: [LayerName; 4] = [
        LayerName::TemplateCompliance,
        LayerName::InstructionAlignment,
        LayerName::HallucinationDetection,
        LayerName::RealityAnchor,
    ];

    /// Configuration key for this layer (`layers.<key>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerName::TemplateCompliance => "template_compliance",
            LayerName::InstructionAlignment => "instruction_alignment",
            LayerName::HallucinationDetection => "hallucination_detection",
            LayerName::RealityAnchor => "reality_anchor",
        }
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Category of a tool-usage violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// A tool was claimed in prose but never invoked.
    FakeClaim,
    /// The request or response implies a tool that was not invoked.
    MissingUsage,
    /// A tool was invoked that the registry does not know.
    UnknownTool,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::FakeClaim => f.write_str("FAKE_CLAIM"),
            ViolationKind::MissingUsage => f.write_str("MISSING_USAGE"),
            ViolationKind::UnknownTool => f.write_str("UNKNOWN_TOOL"),
        }
    }
}

/// A single tool-usage violation found during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,

    /// Tool (or file) the violation is about
    pub subject: String,

    pub message: String,
    pub severity: Severity,
    pub suggested_fix: String,
}

/// Outcome of one validation layer for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerResult {
    /// True when the layer produced no errors
    pub passed: bool,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,

    /// Whether a failure of this layer fails the whole run (from configuration)
    pub is_blocking: bool,

    /// Layer-specific facts and claim pointers backing the findings
    #[serde(default)]
    pub evidence: BTreeMap<String, Value>,
}

/// Aggregated counts across all enabled layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_suggestions: usize,
}

/// The single structured artifact produced by one `validate()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,

    /// No errors anywhere and no blocking layer failed
    pub overall_valid: bool,

    /// Blocking layers that failed, in pipeline order
    pub blocking_failures: Vec<LayerName>,

    pub summary: ReportSummary,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,

    /// One entry per enabled layer; disabled layers have no key
    pub layer_results: BTreeMap<LayerName, LayerResult>,

    /// Effective configuration the run used
    pub config_used: Value,
}

/// Result of reconciling claimed tool usage against actual invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolReport {
    pub valid: bool,
    pub violations: Vec<Violation>,

    /// Claimed tool names in order of occurrence, duplicates retained
    pub tool_claims: Vec<String>,

    /// Distinct invoked tool names, sorted
    pub actual_usage: Vec<String>,

    /// Registry tool names, sorted
    pub available_tools: Vec<String>,
}

impl ToolReport {
    /// Violations of a given kind.
    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

/// Caller-supplied context for a validation run.
///
/// Keys other than the recognized ones are kept in `extra` and passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_request: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server_url: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_request(mut self, request: impl Into<String>) -> Self {
        self.user_request = Some(request.into());
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_dev_server_url(mut self, url: impl Into<String>) -> Self {
        self.dev_server_url = Some(url.into());
        self
    }

    /// The user request, or the empty string when absent.
    pub fn user_request(&self) -> &str {
        self.user_request.as_deref().unwrap_or("")
    }

    /// The project root, defaulting to the current directory.
    pub fn project_root(&self) -> &Path {
        self.project_root
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_names_match_config_keys() {
        let keys: Vec<&str> = LayerName::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "template_compliance",
                "instruction_alignment",
                "hallucination_detection",
                "reality_anchor"
            ]
        );
        let json = serde_json::to_string(&LayerName::RealityAnchor).unwrap();
        assert_eq!(json, "\"reality_anchor\"");
    }

    #[test]
    fn test_violation_wire_names() {
        let violation = Violation {
            kind: ViolationKind::FakeClaim,
            subject: "filesystem".to_string(),
            message: "m".to_string(),
            severity: Severity::Error,
            suggested_fix: "f".to_string(),
        };
        let value = serde_json::to_value(&violation).unwrap();
        assert_eq!(value["kind"], "FAKE_CLAIM");
        assert_eq!(value["severity"], "error");
    }

    #[test]
    fn test_context_defaults_and_passthrough() {
        let context: ValidationContext = serde_json::from_str(
            r#"{"user_request": "Use the template", "template_mentioned": true}"#,
        )
        .unwrap();

        assert_eq!(context.user_request(), "Use the template");
        assert_eq!(context.project_root(), Path::new("."));
        assert_eq!(context.extra.get("template_mentioned"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_layer_results_serialize_with_string_keys() {
        let mut layer_results = BTreeMap::new();
        layer_results.insert(
            LayerName::HallucinationDetection,
            LayerResult {
                passed: true,
                errors: vec![],
                warnings: vec![],
                suggestions: vec![],
                is_blocking: true,
                evidence: BTreeMap::new(),
            },
        );
        let value = serde_json::to_value(&layer_results).unwrap();
        assert!(value.get("hallucination_detection").is_some());
    }
}
