//! Claim detection rule tables.
//!
//! Each family is a list of named rules. A rule is a predicate (`matches`)
//! plus an extractor (`extract`) over one regex.
//!
//! Tool claims match loosely. Actual usage only counts inside a complete
//! function-call envelope.

use lazy_static::lazy_static;
use regex::Regex;

use super::Claim;

/// A named, independently testable extraction rule.
pub struct ClaimRule {
    pub name: &'static str,
    pattern: Regex,
    /// Capture group holding the claim (0 = whole match)
    group: usize,
}

impl ClaimRule {
    fn new(name: &'static str, pattern: &str, group: usize) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            group,
        }
    }

    /// Does this rule fire anywhere in `text`?
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Every claim this rule captures, in order of occurrence.
    pub fn extract(&self, text: &str) -> Vec<Claim> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(self.group))
            .map(|m| Claim {
                text: m.as_str().trim().to_string(),
                start: m.start(),
                end: m.end(),
                rule: self.name,
            })
            .filter(|claim| !claim.text.is_empty())
            .collect()
    }
}

lazy_static! {
    // =========================================================================
    // TOOL-USE CLAIMS
    // =========================================================================

    pub static ref TOOL_CLAIM_RULES: Vec<ClaimRule> = vec![
        ClaimRule::new(
            "announced tool use",
            r"(?i)I['’]ll (?:use|run|execute|search|check|read|write) (\w+)",
            1,
        ),
        ClaimRule::new(
            "progressive tool use",
            r"(?i)(?:Using|Running|Executing) (\w+)",
            1,
        ),
        ClaimRule::new(
            "let-me tool use",
            r"(?i)Let me (?:search|check|read|write|run) (?:with |using )?(\w+)",
            1,
        ),
    ];

    // =========================================================================
    // ACTUAL USAGE (function-call envelope)
    // =========================================================================

    /// A complete `<function_calls>...</function_calls>` block
    pub static ref FUNCTION_CALL_BLOCK: Regex = Regex::new(
        r"(?s)<function_calls>.*?</function_calls>"
    ).unwrap();

    /// An `<invoke name="...">` marker inside a block
    pub static ref INVOKE_MARKER: Regex = Regex::new(
        r#"<invoke name="([^"]+)">"#
    ).unwrap();

    // =========================================================================
    // WORK CLAIMS (feed hallucination detection)
    // =========================================================================

    pub static ref IMPLEMENTATION_CLAIM_RULES: Vec<ClaimRule> = vec![
        ClaimRule::new(
            "implementation",
            r"(?i)\bI (?:created|implemented|added|built|made) (.+)",
            1,
        ),
    ];

    pub static ref FILE_CLAIM_RULES: Vec<ClaimRule> = vec![
        ClaimRule::new(
            "file modification",
            r"(?i)(?:updated|modified|changed) (.+\.(?:tsx?|jsx?|css|html|py|js))",
            1,
        ),
    ];

    pub static ref FEATURE_CLAIM_RULES: Vec<ClaimRule> = vec![
        ClaimRule::new(
            "feature behaviour",
            r"(?i)(?:The|This) (.+) (?:now|will) (?:work|function|display|show) (.+)",
            0,
        ),
    ];

    // =========================================================================
    // FILE MENTIONS
    // =========================================================================

    /// File operation phrasing: read/write/modify/create/update + source file
    pub static ref FILE_OPERATION_RULE: ClaimRule = ClaimRule::new(
        "file operation",
        r"(?i)(?:read|write|modify|create|update) .+\.(?:js|ts|tsx|jsx|py|css|html)",
        0,
    );

    /// Filename-like token ending in a source or markup extension
    pub static ref FILE_REFERENCE_RULE: ClaimRule = ClaimRule::new(
        "file reference",
        r#"([^/\s`'"()\[\]{}<>,;:!?*]+\.(?:tsx?|jsx?|css|html|py|js|json))\b"#,
        1,
    );
}

/// Run every rule of a family and merge the results by position.
///
/// Overlapping captures from different rules are all kept.
pub fn extract_family(rules: &[ClaimRule], text: &str) -> Vec<Claim> {
    let mut claims: Vec<Claim> = rules.iter().flat_map(|rule| rule.extract(text)).collect();
    claims.sort_by_key(|claim| claim.start);
    claims
}
