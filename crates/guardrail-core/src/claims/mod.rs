//! Claim extraction.
//!
//! Free text has no grammar, so every family here is a heuristic rule table.
//! See [`patterns`] for the rules and [`ClaimExtractor`] for the entry points.

mod extractor;
pub mod patterns;

pub use extractor::{ClaimExtractor, CODE_FENCE, FUNCTION_CALLS_OPEN};
pub use patterns::ClaimRule;

use serde::Serialize;

/// One captured claim and where it sits in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub text: String,

    /// Byte offsets of the capture
    pub start: usize,
    pub end: usize,

    /// Name of the rule that produced it
    pub rule: &'static str,
}
