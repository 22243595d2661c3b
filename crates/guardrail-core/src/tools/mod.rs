//! Tool usage reconciliation (the "tool guardian").
//!
//! Compares the tools a response says it used against the tools it actually
//! invoked, and both against a registry of known tools.

mod reconciler;
pub mod registry;
pub mod rules;

pub use reconciler::{ReconcilerSettings, ToolUsageReconciler};
pub use registry::{RegistryError, ToolDescriptor, ToolRegistry};
pub use rules::{MissingUsageRule, RuleInput, MISSING_USAGE_RULES};
