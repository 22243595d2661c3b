//! Hallucination Detection Layer
//!
//! **Question**: Is claimed work backed by code or tool calls?
//!
//! "Evidence" is one global boolean per response: a function-call envelope
//! or a fenced code block anywhere in the text.
//!
//! | Claim | Without evidence |
//! |-------|------------------|
//! | Implementation ("I built X") | error per claim |
//! | File modification ("updated app.py") | one warning |
//! | Feature ("This now shows Y") | one warning, unless "test"/"verify" appears |

use crate::claims::{Claim, ClaimExtractor};
use crate::evidence::{self, Evidence};
use crate::types::LayerName;

use super::{Layer, LayerFindings, LayerRequest};

/// The hallucination detection layer.
pub struct HallucinationDetectionLayer {
    extractor: ClaimExtractor,
}

impl HallucinationDetectionLayer {
    pub fn new() -> Self {
        Self {
            extractor: ClaimExtractor::new(),
        }
    }
}

impl Default for HallucinationDetectionLayer {
    fn default() -> Self {
        Self::new()
    }
}

fn pointers(label: &str, claims: &[Claim]) -> Vec<Evidence> {
    claims
        .iter()
        .map(|c| Evidence::from_response(format!("{}: {}", label, c.text), c.start, c.end))
        .collect()
}

impl Layer for HallucinationDetectionLayer {
    fn name(&self) -> LayerName {
        LayerName::HallucinationDetection
    }

    fn question(&self) -> &'static str {
        "Is claimed work backed by code or tool calls?"
    }

    fn evaluate(&self, request: &LayerRequest<'_>) -> LayerFindings {
        let mut findings = LayerFindings::new();
        let response = request.response;

        let has_function_calls = self.extractor.has_function_calls(response);
        let has_code_blocks = self.extractor.has_code_blocks(response);
        let has_evidence = has_function_calls || has_code_blocks;
        findings.record("has_function_calls", has_function_calls);
        findings.record("has_code_blocks", has_code_blocks);

        let implementation_claims = self.extractor.find_implementation_claims(response);
        if !has_evidence {
            for claim in &implementation_claims {
                findings.error(format!(
                    "Claims to have implemented '{}' but no code or tool calls are shown",
                    claim.text
                ));
                findings.suggest("Show the actual implementation with code blocks or function calls");
            }
        }

        let file_claims = self.extractor.find_file_claims(response);
        if !file_claims.is_empty() && !has_evidence {
            findings.warning("Claims file modifications but no evidence provided");
            findings.suggest("Show the actual file changes or use a file modification tool");
        }

        let feature_claims = self.extractor.find_feature_claims(response);
        let response_lower = response.to_lowercase();
        let mentions_verification =
            response_lower.contains("test") || response_lower.contains("verify");
        if !feature_claims.is_empty() && !mentions_verification {
            findings.warning("Claims about functionality without verification steps");
            findings.suggest("Include testing or verification steps for claimed functionality");
        }

        findings.record(
            "implementation_claims",
            evidence::to_value(&pointers("Implementation claim", &implementation_claims)),
        );
        findings.record(
            "file_claims",
            evidence::to_value(&pointers("File modification claim", &file_claims)),
        );
        findings.record(
            "feature_claims",
            evidence::to_value(&pointers("Feature claim", &feature_claims)),
        );

        findings
    }
}
