//! # guardrail-core
//!
//! Deterministic guardrail checks for AI assistant responses.
//!
//! This crate answers, for a single response:
//! - Did it claim to use tools it never invoked?
//! - Did it follow the template and wording the user asked for?
//! - Is claimed work backed by code or tool calls?
//! - Do the files it mentions exist?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input and project tree always produce the same findings
//! 2. **No LLM calls**: All checks are pattern and rule based
//! 3. **Traceable**: Layer findings carry evidence pointers into the response or project
//! 4. **Stateless**: Validators keep no history; callers own one if they want it
//!
//! ## Example
//!
//! ```rust,ignore
//! use guardrail_core::{Config, ResponseValidator, ValidationContext};
//!
//! let validator = ResponseValidator::new(Config::load(None));
//! let context = ValidationContext::new().with_user_request("Use my template exactly");
//! let report = validator.validate("I'll make it better", &context);
//!
//! if !report.overall_valid {
//!     for error in &report.errors {
//!         println!("ERROR: {}", error);
//!     }
//! }
//! ```

pub mod claims;
pub mod config;
pub mod evidence;
pub mod history;
pub mod layers;
pub mod prompt;
pub mod similarity;
pub mod synthesizer;
pub mod tools;
pub mod types;
pub mod validator;

// Re-export main types at crate root
pub use claims::{Claim, ClaimExtractor};
pub use config::{user_config_path, Config, ConfigError, LayerSettings};
pub use evidence::{Evidence, EvidenceSource};
pub use history::History;
pub use layers::{
    HallucinationDetectionLayer, InstructionAlignmentLayer, Layer, LayerFindings, LayerRequest,
    RealityAnchorLayer, TemplateComplianceLayer,
};
pub use prompt::enhance_prompt;
pub use synthesizer::Synthesizer;
pub use tools::{RegistryError, ToolDescriptor, ToolRegistry, ToolUsageReconciler};
pub use types::{
    LayerName, LayerResult, ReportSummary, RunReport, Severity, ToolReport, ValidationContext,
    Violation, ViolationKind,
};
pub use validator::ResponseValidator;

/// Validate a response with the default configuration.
///
/// # Arguments
///
/// * `response` - The assistant response text
/// * `context` - User request, project root and any extra keys
pub fn validate(response: &str, context: &ValidationContext) -> RunReport {
    ResponseValidator::default().validate(response, context)
}

/// Reconcile tool usage against the baseline registry.
///
/// No discovery files are read; build a [`ToolUsageReconciler`] from a
/// [`Config`] for that.
pub fn validate_tool_usage(response: &str, user_request: &str) -> ToolReport {
    ToolUsageReconciler::default().validate_tool_usage(response, user_request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_claimed_tool_without_invocation() {
        let response = "I'll use filesystem to update app.py";
        let extractor = ClaimExtractor::new();
        assert!(extractor.extract_claims(response).contains(&"filesystem".to_string()));
        assert!(extractor.extract_actual_usage(response).is_empty());

        let report = validate_tool_usage(response, "");
        assert!(!report.valid);
        let fake: Vec<&Violation> = report.violations_of(ViolationKind::FakeClaim).collect();
        assert_eq!(fake.len(), 1);
        assert_eq!(fake[0].subject, "filesystem");
        assert_eq!(fake[0].severity, Severity::Error);
    }

    #[test]
    fn test_claimed_tool_with_invocation() {
        let response = "I'll use filesystem to look around.\n\
            <function_calls><invoke name=\"filesystem\">\n<parameter name=\"path\">.</parameter>\n</invoke></function_calls>";
        let report = validate_tool_usage(response, "");
        assert_eq!(report.violations_of(ViolationKind::FakeClaim).count(), 0);
        assert_eq!(report.actual_usage, vec!["filesystem"]);
    }

    #[test]
    fn test_vague_reply_to_template_request() {
        let dir = TempDir::new().unwrap();
        let context = ValidationContext::new()
            .with_user_request("Make it exactly like the template")
            .with_project_root(dir.path());
        let report = validate("I'll make it better", &context);

        let alignment = &report.layer_results[&LayerName::InstructionAlignment];
        assert_eq!(alignment.errors.len(), 2);
        let template = &report.layer_results[&LayerName::TemplateCompliance];
        assert_eq!(template.errors.len(), 1);
        assert!(!report.overall_valid);
    }

    #[test]
    fn test_misspelled_file_is_non_blocking() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.py"), "print('hi')\n").unwrap();
        let context = ValidationContext::new().with_project_root(dir.path());
        let report = validate("The bug is in aap.py", &context);

        let reality = &report.layer_results[&LayerName::RealityAnchor];
        assert!(reality.passed);
        assert!(!reality.is_blocking);
        assert!(reality.warnings.iter().any(|w| w.contains("app.py")));
        assert!(report.overall_valid);
    }

    #[test]
    fn test_code_block_backs_implementation_claim() {
        let dir = TempDir::new().unwrap();
        let context = ValidationContext::new().with_project_root(dir.path());
        let response = "I implemented the login form\n```tsx\nexport function LoginForm() {}\n```";
        let report = validate(response, &context);

        let hallucination = &report.layer_results[&LayerName::HallucinationDetection];
        assert!(hallucination.errors.is_empty());
        assert!(hallucination.passed);
    }

    #[test]
    fn test_report_serializes_with_layer_keys() {
        let dir = TempDir::new().unwrap();
        let context = ValidationContext::new().with_project_root(dir.path());
        let report = validate("Nothing to check.", &context);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["layer_results"]["reality_anchor"].is_object());
        assert_eq!(json["config_used"]["layers"]["reality_anchor"]["blocking"], false);
    }
}
