//! Evidence linking for layer findings.
//!
//! Findings point back at where they came from: a byte range of the
//! response, a file in the project tree, or a key in the package manifest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a piece of evidence was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Response,
    UserRequest,
    ProjectTree,
    Manifest,
}

/// A piece of evidence supporting a finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    /// What this evidence supports
    pub claim: String,

    /// Where the evidence comes from
    pub source: EvidenceSource,

    /// Pointer to the location (e.g., "response[47:72]")
    pub pointer: String,
}

impl Evidence {
    /// Evidence from a byte range of the response text.
    pub fn from_response(claim: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            claim: claim.into(),
            source: EvidenceSource::Response,
            pointer: format!("response[{}:{}]", start, end),
        }
    }

    /// Evidence from a byte range of the user request.
    pub fn from_user_request(claim: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            claim: claim.into(),
            source: EvidenceSource::UserRequest,
            pointer: format!("user_request[{}:{}]", start, end),
        }
    }

    /// Evidence from a file in the project tree, by relative path.
    pub fn from_project(claim: impl Into<String>, relative_path: impl AsRef<str>) -> Self {
        Self {
            claim: claim.into(),
            source: EvidenceSource::ProjectTree,
            pointer: format!("project_root/{}", relative_path.as_ref()),
        }
    }

    /// Evidence from the package manifest.
    pub fn from_manifest(claim: impl Into<String>, key: impl AsRef<str>) -> Self {
        Self {
            claim: claim.into(),
            source: EvidenceSource::Manifest,
            pointer: format!("manifest.{}", key.as_ref()),
        }
    }
}

/// Serialize a list of evidence for a `LayerResult.evidence` entry.
pub fn to_value(evidence: &[Evidence]) -> Value {
    serde_json::to_value(evidence).unwrap_or(Value::Array(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_from_response() {
        let evidence = Evidence::from_response("Implementation claim", 42, 68);
        assert_eq!(evidence.source, EvidenceSource::Response);
        assert_eq!(evidence.pointer, "response[42:68]");
    }

    #[test]
    fn test_evidence_from_project() {
        let evidence = Evidence::from_project("Close match", "src/app.py");
        assert_eq!(evidence.source, EvidenceSource::ProjectTree);
        assert_eq!(evidence.pointer, "project_root/src/app.py");
    }

    #[test]
    fn test_evidence_from_manifest() {
        let evidence = Evidence::from_manifest("React dependency", "dependencies.react");
        assert_eq!(evidence.pointer, "manifest.dependencies.react");
    }

    #[test]
    fn test_to_value_is_array() {
        let value = to_value(&[Evidence::from_user_request("Critical word", 0, 7)]);
        assert_eq!(value[0]["source"], "user_request");
        assert_eq!(value[0]["pointer"], "user_request[0:7]");
    }
}
