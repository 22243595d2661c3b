//! Synthesizer: folds layer results into one run report.
//!
//! The rules are fixed:
//! 1. Errors, warnings and suggestions are concatenated in pipeline order
//! 2. A blocking layer that did not pass is a blocking failure
//! 3. The run is valid only with zero errors and zero blocking failures

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config::Config;
use crate::types::{LayerName, LayerResult, ReportSummary, RunReport};

/// The Synthesizer aggregates layer results into a final report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate results of the enabled layers.
    ///
    /// # Arguments
    ///
    /// * `results` - One entry per enabled layer, in pipeline order
    /// * `config` - The effective configuration, copied into the report
    pub fn synthesize(&self, results: Vec<(LayerName, LayerResult)>, config: &Config) -> RunReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();
        let mut blocking_failures = Vec::new();
        let mut layer_results = BTreeMap::new();

        for (name, result) in results {
            errors.extend(result.errors.iter().cloned());
            warnings.extend(result.warnings.iter().cloned());
            suggestions.extend(result.suggestions.iter().cloned());

            if result.is_blocking && !result.passed {
                blocking_failures.push(name);
            }
            layer_results.insert(name, result);
        }

        let summary = ReportSummary {
            total_errors: errors.len(),
            total_warnings: warnings.len(),
            total_suggestions: suggestions.len(),
        };

        RunReport {
            timestamp: Utc::now(),
            overall_valid: summary.total_errors == 0 && blocking_failures.is_empty(),
            blocking_failures,
            summary,
            errors,
            warnings,
            suggestions,
            layer_results,
            config_used: config.as_value().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn result(errors: usize, warnings: usize, is_blocking: bool) -> LayerResult {
        LayerResult {
            passed: errors == 0,
            errors: (0..errors).map(|i| format!("error {}", i)).collect(),
            warnings: (0..warnings).map(|i| format!("warning {}", i)).collect(),
            suggestions: vec![],
            is_blocking,
            evidence: BTreeMap::new(),
        }
    }

    #[test]
    fn test_empty_run_is_valid() {
        let report = Synthesizer::new().synthesize(vec![], &Config::defaults());
        assert!(report.overall_valid);
        assert!(report.layer_results.is_empty());
        assert_eq!(report.summary, ReportSummary::default());
    }

    #[test]
    fn test_warnings_do_not_fail_run() {
        let report = Synthesizer::new().synthesize(
            vec![(LayerName::RealityAnchor, result(0, 2, false))],
            &Config::defaults(),
        );
        assert!(report.overall_valid);
        assert_eq!(report.summary.total_warnings, 2);
    }

    #[test]
    fn test_blocking_failure_recorded_in_order() {
        let report = Synthesizer::new().synthesize(
            vec![
                (LayerName::TemplateCompliance, result(1, 0, true)),
                (LayerName::InstructionAlignment, result(0, 0, true)),
                (LayerName::HallucinationDetection, result(2, 0, true)),
            ],
            &Config::defaults(),
        );
        assert!(!report.overall_valid);
        assert_eq!(
            report.blocking_failures,
            vec![LayerName::TemplateCompliance, LayerName::HallucinationDetection]
        );
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_non_blocking_errors_still_fail_run() {
        let report = Synthesizer::new().synthesize(
            vec![(LayerName::RealityAnchor, result(1, 0, false))],
            &Config::defaults(),
        );
        assert!(!report.overall_valid);
        assert!(report.blocking_failures.is_empty());
    }

    #[test]
    fn test_config_is_copied_into_report() {
        let config = Config::from_json(r#"{"strict_mode": true, "team": "web"}"#).unwrap();
        let report = Synthesizer::new().synthesize(vec![], &config);
        assert_eq!(report.config_used["team"], "web");
        assert_eq!(report.config_used["strict_mode"], true);
    }

    proptest! {
        #[test]
        fn test_aggregation_invariant(
            layers in proptest::collection::vec((0usize..4, 0usize..4, any::<bool>()), 0..=4)
        ) {
            let results: Vec<(LayerName, LayerResult)> = layers
                .iter()
                .zip(LayerName::ALL.iter())
                .map(|(&(e, w, blocking), &name)| (name, result(e, w, blocking)))
                .collect();
            let expected_errors: usize = results.iter().map(|(_, r)| r.errors.len()).sum();
            let any_blocking_failed = results.iter().any(|(_, r)| r.is_blocking && !r.passed);

            let report = Synthesizer::new().synthesize(results, &Config::defaults());

            prop_assert_eq!(report.summary.total_errors, expected_errors);
            prop_assert_eq!(report.errors.len(), expected_errors);
            prop_assert_eq!(report.overall_valid, expected_errors == 0 && !any_blocking_failed);
        }
    }
}
