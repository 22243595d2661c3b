//! Tool usage reconciliation: claimed vs. invoked vs. known tools.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::claims::ClaimExtractor;
use crate::config::Config;
use crate::history::History;
use crate::types::{Severity, ToolReport, Violation, ViolationKind};

use super::registry::ToolRegistry;
use super::rules::{RuleInput, MISSING_USAGE_RULES};

/// Switches read from `tool_validation.*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Run the fake-claim check
    pub require_tool_usage_for_claims: bool,

    /// Fake claims are errors (otherwise warnings)
    pub block_fake_tool_claims: bool,

    /// Consult the missing-usage rule table
    pub suggest_missing_tools: bool,
}

impl ReconcilerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            require_tool_usage_for_claims: config.require_tool_usage_for_claims(),
            block_fake_tool_claims: config.block_fake_tool_claims(),
            suggest_missing_tools: config.suggest_missing_tools(),
        }
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            require_tool_usage_for_claims: true,
            block_fake_tool_claims: true,
            suggest_missing_tools: true,
        }
    }
}

/// The tool guardian.
///
/// Holds an immutable registry established at construction; each call is
/// otherwise a pure function of the response text and user request.
pub struct ToolUsageReconciler {
    registry: ToolRegistry,
    settings: ReconcilerSettings,
    extractor: ClaimExtractor,
}

impl ToolUsageReconciler {
    /// Reconcile against `registry` with default settings.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            settings: ReconcilerSettings::default(),
            extractor: ClaimExtractor::new(),
        }
    }

    /// Discover the registry and read settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ToolRegistry::discover(config)).with_settings(ReconcilerSettings::from_config(config))
    }

    pub fn with_settings(mut self, settings: ReconcilerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Diff claimed tool usage against the function-call envelope.
    ///
    /// Never fails: unmatched patterns just mean empty claim sets.
    pub fn validate_tool_usage(&self, response: &str, user_request: &str) -> ToolReport {
        let tool_claims = self.extractor.extract_claims(response);
        let actual_usage = self.extractor.extract_actual_usage(response);

        let mut violations = Vec::new();
        if self.settings.require_tool_usage_for_claims {
            violations.extend(self.check_fake_claims(&tool_claims, &actual_usage));
        }
        if self.settings.suggest_missing_tools {
            let input = RuleInput {
                user_request,
                response,
            };
            violations.extend(self.check_missing_usage(&input, &actual_usage));
        }
        violations.extend(self.check_unknown_tools(&actual_usage));

        debug!(
            claims = tool_claims.len(),
            invoked = actual_usage.len(),
            violations = violations.len(),
            "reconciled tool usage"
        );

        ToolReport {
            valid: violations.is_empty(),
            violations,
            tool_claims,
            actual_usage: actual_usage.into_iter().collect(),
            available_tools: self.registry.names(),
        }
    }

    /// Same as [`validate_tool_usage`](Self::validate_tool_usage), appending the report to `history`.
    pub fn validate_recorded<'h>(
        &self,
        response: &str,
        user_request: &str,
        history: &'h mut History<ToolReport>,
    ) -> &'h ToolReport {
        history.record(self.validate_tool_usage(response, user_request))
    }

    /// One violation per distinct (case-insensitive) claim with no invocation.
    fn check_fake_claims(&self, claims: &[String], actual_usage: &BTreeSet<String>) -> Vec<Violation> {
        let invoked: HashSet<String> = actual_usage.iter().map(|t| t.to_lowercase()).collect();
        let mut reported = HashSet::new();
        let severity = if self.settings.block_fake_tool_claims {
            Severity::Error
        } else {
            Severity::Warning
        };

        claims
            .iter()
            .filter(|claim| {
                let lower = claim.to_lowercase();
                !invoked.contains(&lower) && reported.insert(lower)
            })
            .map(|claim| Violation {
                kind: ViolationKind::FakeClaim,
                subject: claim.clone(),
                message: format!("Claimed to use '{}' but no function calls found", claim),
                severity,
                suggested_fix: format!("Actually use the {} tool or remove the claim", claim),
            })
            .collect()
    }

    fn check_missing_usage(
        &self,
        input: &RuleInput<'_>,
        actual_usage: &BTreeSet<String>,
    ) -> Vec<Violation> {
        MISSING_USAGE_RULES
            .iter()
            .filter(|rule| !rule.requires_registered || self.registry.contains(rule.tool))
            .filter(|rule| !actual_usage.iter().any(|t| t.eq_ignore_ascii_case(rule.tool)))
            .filter(|rule| (rule.trigger)(input))
            .map(|rule| {
                debug!(rule = rule.name, tool = rule.tool, "missing tool usage");
                Violation {
                    kind: ViolationKind::MissingUsage,
                    subject: rule.tool.to_string(),
                    message: rule.message.to_string(),
                    severity: rule.severity,
                    suggested_fix: rule.suggested_fix.to_string(),
                }
            })
            .collect()
    }

    /// Invoked tools the registry does not know are suspicious, not wrong.
    fn check_unknown_tools(&self, actual_usage: &BTreeSet<String>) -> Vec<Violation> {
        actual_usage
            .iter()
            .filter(|name| !self.registry.contains(name))
            .map(|name| Violation {
                kind: ViolationKind::UnknownTool,
                subject: name.clone(),
                message: format!("Used unknown tool '{}'", name),
                severity: Severity::Warning,
                suggested_fix: format!("Verify tool '{}' is correctly configured", name),
            })
            .collect()
    }
}

impl Default for ToolUsageReconciler {
    fn default() -> Self {
        Self::new(ToolRegistry::baseline())
    }
}
