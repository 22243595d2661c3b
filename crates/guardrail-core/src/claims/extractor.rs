//! The claim extractor: pulls assertions and invocation evidence out of text.

use std::collections::BTreeSet;

use super::patterns::{
    extract_family, FEATURE_CLAIM_RULES, FILE_CLAIM_RULES, FILE_OPERATION_RULE,
    FILE_REFERENCE_RULE, FUNCTION_CALL_BLOCK, IMPLEMENTATION_CLAIM_RULES, INVOKE_MARKER,
    TOOL_CLAIM_RULES,
};
use super::Claim;

/// Opening delimiter of the function-call envelope.
pub const FUNCTION_CALLS_OPEN: &str = "<function_calls>";

/// Fenced code block delimiter.
pub const CODE_FENCE: &str = "```";

/// Regex-based claim extractor.
///
/// Stateless; every method is a pure function of its input. Results keep
/// duplicates and are ordered by first occurrence. Deduplication is the
/// consumer's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimExtractor;

impl ClaimExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Tool-use claims with their positions.
    pub fn find_tool_claims(&self, text: &str) -> Vec<Claim> {
        extract_family(&TOOL_CLAIM_RULES, text)
    }

    /// Presumed tool names from tool-use phrasing.
    pub fn extract_claims(&self, text: &str) -> Vec<String> {
        into_texts(self.find_tool_claims(text))
    }

    /// Distinct tool names invoked inside function-call envelopes.
    ///
    /// Empty when the text carries no envelope at all.
    pub fn extract_actual_usage(&self, text: &str) -> BTreeSet<String> {
        FUNCTION_CALL_BLOCK
            .find_iter(text)
            .flat_map(|block| {
                INVOKE_MARKER
                    .captures_iter(block.as_str())
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn find_implementation_claims(&self, text: &str) -> Vec<Claim> {
        extract_family(&IMPLEMENTATION_CLAIM_RULES, text)
    }

    /// "I created/implemented/added/built/made X" claims.
    pub fn extract_implementation_claims(&self, text: &str) -> Vec<String> {
        into_texts(self.find_implementation_claims(text))
    }

    pub fn find_file_claims(&self, text: &str) -> Vec<Claim> {
        extract_family(&FILE_CLAIM_RULES, text)
    }

    /// "updated/modified/changed FILE.ext" claims.
    pub fn extract_file_claims(&self, text: &str) -> Vec<String> {
        into_texts(self.find_file_claims(text))
    }

    pub fn find_feature_claims(&self, text: &str) -> Vec<Claim> {
        extract_family(&FEATURE_CLAIM_RULES, text)
    }

    /// "The/This X now/will work/function/display/show Y" claims.
    pub fn extract_feature_claims(&self, text: &str) -> Vec<String> {
        into_texts(self.find_feature_claims(text))
    }

    /// Filename-like tokens, duplicates retained.
    pub fn find_file_references(&self, text: &str) -> Vec<Claim> {
        FILE_REFERENCE_RULE.extract(text)
    }

    /// Does the text describe operating on a source file?
    pub fn mentions_file_operation(&self, text: &str) -> bool {
        FILE_OPERATION_RULE.matches(text)
    }

    pub fn has_function_calls(&self, text: &str) -> bool {
        text.contains(FUNCTION_CALLS_OPEN)
    }

    pub fn has_code_blocks(&self, text: &str) -> bool {
        text.contains(CODE_FENCE)
    }
}

fn into_texts(claims: Vec<Claim>) -> Vec<String> {
    claims.into_iter().map(|claim| claim.text).collect()
}
