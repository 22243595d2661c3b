//! Plain-text feedback for terminal output.

use std::fmt::Write;

use guardrail_core::{LayerName, RunReport, ToolReport};

fn title(name: LayerName) -> String {
    name.as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{}:", heading);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Render a run report.
pub fn run_report(report: &RunReport) -> String {
    let mut out = String::new();

    if report.overall_valid {
        out.push_str("VALIDATION PASSED\n");
    } else {
        out.push_str("VALIDATION FAILED\n");
    }

    if !report.blocking_failures.is_empty() {
        let names: Vec<String> = report.blocking_failures.iter().map(|n| title(*n)).collect();
        let _ = writeln!(out, "Blocking failures: {}", names.join(", "));
    }

    let _ = writeln!(
        out,
        "Errors: {}  Warnings: {}  Suggestions: {}",
        report.summary.total_errors, report.summary.total_warnings, report.summary.total_suggestions
    );

    if !report.layer_results.is_empty() {
        out.push_str("\nLayers:\n");
        for (name, result) in &report.layer_results {
            let mark = if result.passed { "ok  " } else { "FAIL" };
            let _ = writeln!(out, "  [{}] {}", mark, title(*name));
        }
    }

    list(&mut out, "Errors", &report.errors);
    list(&mut out, "Warnings", &report.warnings);
    list(&mut out, "Suggestions", &report.suggestions);

    out
}

/// Render a tool report.
pub fn tool_report(report: &ToolReport) -> String {
    let mut out = String::new();

    if report.valid {
        out.push_str("TOOL USAGE VALID\n");
    } else {
        out.push_str("TOOL USAGE INVALID\n");
    }

    let _ = writeln!(out, "Claimed:   {}", report.tool_claims.join(", "));
    let _ = writeln!(out, "Used:      {}", report.actual_usage.join(", "));
    let _ = writeln!(out, "Available: {}", report.available_tools.join(", "));

    if !report.violations.is_empty() {
        out.push_str("\nViolations:\n");
        for violation in &report.violations {
            let _ = writeln!(
                out,
                "  - {} ({}): {}",
                violation.kind, violation.severity, violation.message
            );
            let _ = writeln!(out, "    Fix: {}", violation.suggested_fix);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_layer_names() {
        assert_eq!(title(LayerName::RealityAnchor), "Reality Anchor");
        assert_eq!(title(LayerName::HallucinationDetection), "Hallucination Detection");
    }

    #[test]
    fn test_tool_report_lists_fixes() {
        let report = guardrail_core::validate_tool_usage("I'll use filesystem", "");
        let text = tool_report(&report);
        assert!(text.starts_with("TOOL USAGE INVALID"));
        assert!(text.contains("FAKE_CLAIM (error)"));
        assert!(text.contains("Fix: Actually use the filesystem tool or remove the claim"));
    }
}
