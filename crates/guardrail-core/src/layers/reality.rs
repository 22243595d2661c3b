//! Reality Anchor Layer
//!
//! **Question**: Do the files the response mentions exist?
//!
//! Filename-like tokens are checked against a walk of `project_root`. A
//! reference not found verbatim gets the closest listed paths as a warning.
//! A `package.json` at the root is used to flag framework vocabulary that does
//! not fit the project, as a suggestion only. Nothing here is ever an error.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::claims::ClaimExtractor;
use crate::evidence::{self, Evidence};
use crate::similarity::{close_matches, DEFAULT_CUTOFF, DEFAULT_LIMIT};
use crate::types::LayerName;

use super::{Layer, LayerFindings, LayerRequest};

/// Directories never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "__pycache__", "dist", "build"];

const MANIFEST_FILE: &str = "package.json";

/// Framework consistency rules: (dependency, own name in text, trigger terms, suggestion).
const FRAMEWORK_RULES: &[(&str, &str, &[&str], &str)] = &[
    (
        "next",
        "next",
        &["react", "component", "jsx"],
        "Consider using Next.js specific patterns for this project",
    ),
    (
        "react",
        "react",
        &["component", "jsx", "hook"],
        "Consider using React patterns for this project",
    ),
];

/// The reality anchor layer.
pub struct RealityAnchorLayer {
    extractor: ClaimExtractor,
}

impl RealityAnchorLayer {
    pub fn new() -> Self {
        Self {
            extractor: ClaimExtractor::new(),
        }
    }

    /// Check file references against the project listing.
    fn check_references(&self, response: &str, root: &Path, findings: &mut LayerFindings) {
        let mut seen = HashSet::new();
        let references: Vec<String> = self
            .extractor
            .find_file_references(response)
            .into_iter()
            .map(|claim| claim.text)
            .filter(|name| seen.insert(name.clone()))
            .collect();
        findings.record("file_references", references.clone());

        if !root.is_dir() {
            debug!(root = %root.display(), "project root is not a directory, skipping file check");
            findings.record("project_root_found", false);
            return;
        }
        findings.record("project_root_found", true);

        let project_files = list_project_files(root);
        findings.record("project_files_scanned", project_files.len());

        let mut matched = Vec::new();
        for reference in &references {
            if project_files.iter().any(|f| f == reference) {
                continue;
            }

            let similar = close_matches(reference, &project_files, DEFAULT_LIMIT, DEFAULT_CUTOFF);
            if similar.is_empty() {
                findings.warning(format!("References potentially non-existent file: {}", reference));
            } else {
                findings.warning(format!(
                    "References '{}' - did you mean: {}?",
                    reference,
                    similar.join(", ")
                ));
                matched.extend(
                    similar
                        .iter()
                        .map(|path| Evidence::from_project(format!("Close match for {}", reference), path)),
                );
            }
        }
        findings.record("close_matches", evidence::to_value(&matched));
    }

    /// Flag framework vocabulary that does not fit the manifest.
    fn check_manifest(&self, response: &str, root: &Path, findings: &mut LayerFindings) {
        let manifest_path = root.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return;
        }

        let manifest = match read_manifest(&manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(path = %manifest_path.display(), error = %e, "could not parse package manifest");
                findings.warning(format!("Could not parse package.json: {}", e));
                return;
            }
        };

        let Some(dependencies) = manifest.get("dependencies").and_then(Value::as_object) else {
            return;
        };

        let response_lower = response.to_lowercase();
        let mut used = Vec::new();
        for (dependency, own_name, terms, suggestion) in FRAMEWORK_RULES {
            if !dependencies.contains_key(*dependency) || response_lower.contains(own_name) {
                continue;
            }
            if terms.iter().any(|term| response_lower.contains(term)) {
                findings.suggest(*suggestion);
                used.push(Evidence::from_manifest(
                    format!("Project depends on {}", dependency),
                    format!("dependencies.{}", dependency),
                ));
            }
        }
        findings.record("framework_mismatches", evidence::to_value(&used));
    }
}

impl Default for RealityAnchorLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for RealityAnchorLayer {
    fn name(&self) -> LayerName {
        LayerName::RealityAnchor
    }

    fn question(&self) -> &'static str {
        "Do the files the response mentions exist?"
    }

    fn evaluate(&self, request: &LayerRequest<'_>) -> LayerFindings {
        let mut findings = LayerFindings::new();
        let root = request.context.project_root();

        self.check_references(request.response, root, &mut findings);
        self.check_manifest(request.response, root, &mut findings);

        findings
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Relative paths (forward slashes) of every file under `root`, sorted.
fn list_project_files(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|relative| relative.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

fn read_manifest(path: &Path) -> Result<Value, String> {
    let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}
