//! Instruction Alignment Layer
//!
//! **Question**: Did the response honour the user's precise wording?
//!
//! Critical words in the request ("exactly", "must", ...) have to be echoed
//! by the response. When the request asks for something exact or specific,
//! stock vague promises are errors.

use lazy_static::lazy_static;
use regex::Regex;

use crate::evidence::{self, Evidence};
use crate::types::LayerName;

use super::{Layer, LayerFindings, LayerRequest};

/// Words that, when present in the request, must also appear in the response.
const CRITICAL_WORDS: &[&str] = &["exactly", "specifically", "must", "required", "essential"];

/// Request words that make vague promises unacceptable.
const PRECISION_WORDS: &[&str] = &["exactly", "specifically"];

/// Known vague-promise phrases.
const VAGUE_PHRASES: &[&str] = &[
    "I'll make it better",
    "I'll improve",
    "I'll enhance",
    "I'll create a nice",
    "I'll add some styling",
];

lazy_static! {
    // Matched against the original text so spans stay valid byte offsets
    static ref CRITICAL_WORD_PATTERNS: Vec<(&'static str, Regex)> = CRITICAL_WORDS
        .iter()
        .map(|word| (*word, phrase_pattern(word)))
        .collect();

    static ref VAGUE_PHRASE_PATTERNS: Vec<(&'static str, Regex)> = VAGUE_PHRASES
        .iter()
        .map(|phrase| (*phrase, phrase_pattern(phrase)))
        .collect();
}

/// Case-insensitive literal match; a straight apostrophe also matches `’`.
fn phrase_pattern(phrase: &str) -> Regex {
    let literal = regex::escape(phrase).replace('\'', "['’]");
    Regex::new(&format!("(?i){}", literal)).unwrap()
}

/// The instruction alignment layer.
pub struct InstructionAlignmentLayer;

impl InstructionAlignmentLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InstructionAlignmentLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for InstructionAlignmentLayer {
    fn name(&self) -> LayerName {
        LayerName::InstructionAlignment
    }

    fn question(&self) -> &'static str {
        "Did the response honour the user's precise wording?"
    }

    fn evaluate(&self, request: &LayerRequest<'_>) -> LayerFindings {
        let mut findings = LayerFindings::new();

        let user_request = request.context.user_request();
        let response = request.response;

        let mut critical = Vec::new();
        for (word, pattern) in CRITICAL_WORD_PATTERNS.iter() {
            let Some(m) = pattern.find(user_request) else {
                continue;
            };
            critical.push(Evidence::from_user_request(
                format!("Critical word '{}'", word),
                m.start(),
                m.end(),
            ));
            if !pattern.is_match(response) {
                findings.error(format!(
                    "Critical instruction word '{}' not addressed in response",
                    word
                ));
            }
        }
        findings.record("critical_words", evidence::to_value(&critical));

        let request_lower = user_request.to_lowercase();
        let wants_precision = PRECISION_WORDS.iter().any(|w| request_lower.contains(w));
        let mut vague = Vec::new();
        if wants_precision {
            for (phrase, pattern) in VAGUE_PHRASE_PATTERNS.iter() {
                let Some(m) = pattern.find(response) else {
                    continue;
                };
                vague.push(Evidence::from_response(
                    format!("Vague phrase '{}'", phrase),
                    m.start(),
                    m.end(),
                ));
                findings.error(format!("Vague response '{}' to specific instruction", phrase));
                findings.suggest("Provide specific implementation details instead of generic promises");
            }
        }
        findings.record("vague_phrases", evidence::to_value(&vague));

        findings
    }
}
