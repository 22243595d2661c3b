//! Validation layers.
//!
//! Every layer has the same shape, `(response, context) -> findings`, and
//! answers one question about the response:
//!
//! | Layer | Question |
//! |-------|----------|
//! | Template compliance | Did it follow the template the user pointed at? |
//! | Instruction alignment | Did it honour the user's precise wording? |
//! | Hallucination detection | Is claimed work backed by code or tool calls? |
//! | Reality anchor | Do the files it mentions exist? |
//!
//! Layers know nothing about blocking; the pipeline stamps that from
//! configuration when it turns findings into a `LayerResult`.

mod alignment;
mod hallucination;
mod reality;
mod template;

pub use alignment::InstructionAlignmentLayer;
pub use hallucination::HallucinationDetectionLayer;
pub use reality::{RealityAnchorLayer, EXCLUDED_DIRS};
pub use template::TemplateComplianceLayer;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{LayerName, LayerResult, ValidationContext};

/// Input to a layer.
pub struct LayerRequest<'a> {
    pub response: &'a str,
    pub context: &'a ValidationContext,
}

/// A validation layer.
pub trait Layer {
    fn name(&self) -> LayerName;

    /// The question this layer answers.
    fn question(&self) -> &'static str;

    fn evaluate(&self, request: &LayerRequest<'_>) -> LayerFindings;
}

/// What a layer found, before blocking is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFindings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub evidence: BTreeMap<String, Value>,
}

impl LayerFindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add a suggestion unless the same one is already present.
    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
    }

    pub fn record(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.evidence.insert(key.into(), value.into());
    }

    /// Seal into an immutable result; a layer passes iff it has no errors.
    pub fn into_result(self, is_blocking: bool) -> LayerResult {
        LayerResult {
            passed: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            suggestions: self.suggestions,
            is_blocking,
            evidence: self.evidence,
        }
    }
}

/// The built-in layers in pipeline order.
pub fn default_layers() -> Vec<Box<dyn Layer>> {
    vec![
        Box::new(TemplateComplianceLayer::new()),
        Box::new(InstructionAlignmentLayer::new()),
        Box::new(HallucinationDetectionLayer::new()),
        Box::new(RealityAnchorLayer::new()),
    ]
}
