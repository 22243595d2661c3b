//! Template Compliance Layer
//!
//! **Question**: Did the response follow the template the user pointed at?
//!
//! Only engages when the user request mentions a template. The response must
//! acknowledge it with one of a fixed set of phrases; substitution language
//! ("instead", "better approach", "custom design") is flagged as a warning.

use lazy_static::lazy_static;
use regex::Regex;

use crate::evidence::{self, Evidence};
use crate::types::LayerName;

use super::{Layer, LayerFindings, LayerRequest};

/// Phrases that count as referencing the template.
const ACKNOWLEDGEMENT_PHRASES: &[&str] = &[
    "template",
    "provided example",
    "your example",
    "following the",
];

lazy_static! {
    // Deviation language - the assistant substituting its own design
    static ref DEVIATION_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("substitution", Regex::new(r"(?i)(?:instead|rather than|different from)").unwrap()),
        ("self-improvement", Regex::new(r"(?i)(?:better|improved) (?:version|approach)").unwrap()),
        ("custom design", Regex::new(r"(?i)(?:custom|unique|original) (?:design|implementation)").unwrap()),
    ];
}

/// The template compliance layer.
pub struct TemplateComplianceLayer;

impl TemplateComplianceLayer {
    pub fn new() -> Self {
        Self
    }

    fn references_template(&self, response_lower: &str) -> bool {
        ACKNOWLEDGEMENT_PHRASES
            .iter()
            .any(|phrase| response_lower.contains(phrase))
    }

    /// First match of each deviation pattern.
    fn check_deviation(&self, response: &str) -> Vec<(String, usize, usize)> {
        DEVIATION_PATTERNS
            .iter()
            .filter_map(|(name, regex)| {
                regex
                    .find(response)
                    .map(|m| (format!("{} '{}'", name, m.as_str()), m.start(), m.end()))
            })
            .collect()
    }
}

impl Default for TemplateComplianceLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for TemplateComplianceLayer {
    fn name(&self) -> LayerName {
        LayerName::TemplateCompliance
    }

    fn question(&self) -> &'static str {
        "Did the response follow the template the user pointed at?"
    }

    fn evaluate(&self, request: &LayerRequest<'_>) -> LayerFindings {
        let mut findings = LayerFindings::new();

        let template_mentioned = request
            .context
            .user_request()
            .to_lowercase()
            .contains("template");
        findings.record("template_mentioned", template_mentioned);

        if !template_mentioned {
            return findings;
        }

        let referenced = self.references_template(&request.response.to_lowercase());
        findings.record("template_referenced", referenced);

        if !referenced {
            findings.error("User mentioned a template but the response doesn't reference it");
            findings.suggest("Explicitly reference the provided template in your response");
        }

        let deviations: Vec<Evidence> = self
            .check_deviation(request.response)
            .into_iter()
            .map(|(pattern, start, end)| {
                findings.warning(format!("Potential template deviation detected: {}", pattern));
                Evidence::from_response(format!("Deviation language: {}", pattern), start, end)
            })
            .collect();

        findings.record("deviations", evidence::to_value(&deviations));

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationContext;

    fn evaluate(user_request: &str, response: &str) -> LayerFindings {
        let context = ValidationContext::new().with_user_request(user_request);
        TemplateComplianceLayer::new().evaluate(&LayerRequest {
            response,
            context: &context,
        })
    }

    #[test]
    fn test_no_template_mentioned_is_silent() {
        let findings = evaluate("Build a login page", "I'll build it my own way instead.");
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
        assert_eq!(findings.evidence["template_mentioned"], false);
    }

    #[test]
    fn test_template_not_referenced_is_error() {
        let findings = evaluate("Make it exactly like the template", "I'll make it better");
        assert_eq!(findings.errors.len(), 1);
        assert_eq!(findings.suggestions.len(), 1);
    }

    #[test]
    fn test_acknowledgement_phrases() {
        for response in [
            "Following the layout you gave me...",
            "Based on your example, here is the page.",
            "I used the TEMPLATE as the base.",
        ] {
            let findings = evaluate("Use my template", response);
            assert!(findings.errors.is_empty(), "rejected: {}", response);
        }
    }

    #[test]
    fn test_deviation_is_warning_only() {
        let findings = evaluate(
            "Use the HTML template",
            "Following the template, but with a better approach and a custom design instead.",
        );
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 3);
        assert_eq!(findings.evidence["deviations"].as_array().unwrap().len(), 3);
    }
}
