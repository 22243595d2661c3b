//! The validation pipeline.
//!
//! Runs each enabled layer in order, stamps its blocking flag from
//! configuration and hands the results to the synthesizer.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::history::History;
use crate::layers::{default_layers, Layer, LayerRequest};
use crate::synthesizer::Synthesizer;
use crate::types::{LayerName, LayerResult, RunReport, ValidationContext};

/// Multi-layer response validator.
pub struct ResponseValidator {
    config: Config,
    layers: Vec<Box<dyn Layer>>,
    synthesizer: Synthesizer,
}

impl ResponseValidator {
    /// A validator running the built-in layers.
    pub fn new(config: Config) -> Self {
        Self::with_layers(config, default_layers())
    }

    /// A validator running `layers` in the given order.
    ///
    /// Each layer name runs at most once: a later layer reusing a name is
    /// dropped with a warning.
    pub fn with_layers(config: Config, layers: Vec<Box<dyn Layer>>) -> Self {
        let mut seen: Vec<LayerName> = Vec::with_capacity(layers.len());
        let layers = layers
            .into_iter()
            .filter(|layer| {
                let name = layer.name();
                if seen.contains(&name) {
                    warn!(layer = %name, "duplicate layer name, ignoring later layer");
                    return false;
                }
                seen.push(name);
                true
            })
            .collect();

        Self {
            config,
            layers,
            synthesizer: Synthesizer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate one response.
    ///
    /// Disabled layers are skipped entirely and leave no key in the report.
    pub fn validate(&self, response: &str, context: &ValidationContext) -> RunReport {
        let request = LayerRequest { response, context };

        let results: Vec<(LayerName, LayerResult)> = self
            .layers
            .iter()
            .filter_map(|layer| {
                let name = layer.name();
                let settings = self.config.layer(name);
                if !settings.enabled {
                    debug!(layer = %name, "layer disabled, skipping");
                    return None;
                }

                debug!(layer = %name, question = layer.question(), "evaluating layer");
                let result = layer.evaluate(&request).into_result(settings.blocking);
                debug!(
                    layer = %name,
                    passed = result.passed,
                    errors = result.errors.len(),
                    warnings = result.warnings.len(),
                    "layer finished"
                );
                Some((name, result))
            })
            .collect();

        let report = self.synthesizer.synthesize(results, &self.config);
        info!(
            overall_valid = report.overall_valid,
            errors = report.summary.total_errors,
            warnings = report.summary.total_warnings,
            "validation complete"
        );
        report
    }

    /// Same as [`validate`](Self::validate), appending the report to `history`.
    pub fn validate_recorded<'h>(
        &self,
        response: &str,
        context: &ValidationContext,
        history: &'h mut History<RunReport>,
    ) -> &'h RunReport {
        history.record(self.validate(response, context))
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(Config::defaults())
    }
}
