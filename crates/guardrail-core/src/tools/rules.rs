//! Missing-usage rule table.
//!
//! Each rule is (trigger predicate, required tool, severity).

use crate::claims::ClaimExtractor;
use crate::types::Severity;

/// What a missing-usage trigger gets to look at.
pub struct RuleInput<'a> {
    pub user_request: &'a str,
    pub response: &'a str,
}

/// One heuristic: when `trigger` fires, `tool` should have been invoked.
pub struct MissingUsageRule {
    pub name: &'static str,
    pub tool: &'static str,
    pub severity: Severity,

    /// Only applies when the registry knows `tool`
    pub requires_registered: bool,

    pub trigger: fn(&RuleInput<'_>) -> bool,
    pub message: &'static str,
    pub suggested_fix: &'static str,
}

fn request_mentions_search(input: &RuleInput<'_>) -> bool {
    input.user_request.to_lowercase().contains("search")
}

fn response_describes_file_operation(input: &RuleInput<'_>) -> bool {
    ClaimExtractor::new().mentions_file_operation(input.response)
}

pub const MISSING_USAGE_RULES: &[MissingUsageRule] = &[
    MissingUsageRule {
        name: "search requested",
        tool: "web_search",
        severity: Severity::Warning,
        requires_registered: true,
        trigger: request_mentions_search,
        message: "User requested search but web_search tool not used",
        suggested_fix: "Use web_search tool for current information",
    },
    MissingUsageRule {
        name: "file operation described",
        tool: "filesystem",
        severity: Severity::Error,
        requires_registered: false,
        trigger: response_describes_file_operation,
        message: "Claims file operations but filesystem tool not used",
        suggested_fix: "Use filesystem tool for file operations",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(user_request: &'a str, response: &'a str) -> RuleInput<'a> {
        RuleInput {
            user_request,
            response,
        }
    }

    #[test]
    fn test_search_trigger() {
        let rule = &MISSING_USAGE_RULES[0];
        assert!((rule.trigger)(&input("Please SEARCH for the docs", "")));
        assert!(!(rule.trigger)(&input("Fix the bug", "search results")));
    }

    #[test]
    fn test_file_operation_trigger() {
        let rule = &MISSING_USAGE_RULES[1];
        assert!((rule.trigger)(&input("", "I'll update app.py next")));
        assert!(!(rule.trigger)(&input("update app.py", "Done.")));
        assert!(rule.severity.is_error());
    }
}
