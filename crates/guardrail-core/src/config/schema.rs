//! Schema check for configuration overrides.
//!
//! Overrides are checked against `schema/config.schema.json` before they are
//! merged, so typed accessors never see a non-boolean `enabled` flag.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

const SCHEMA_SOURCE: &str = include_str!("../../schema/config.schema.json");

static VALIDATOR: OnceLock<Result<Validator, SchemaError>> = OnceLock::new();

/// The embedded schema itself is broken.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("embedded config schema is not JSON: {0}")]
    InvalidJson(String),

    #[error("embedded config schema does not compile: {0}")]
    Compile(String),
}

fn compile() -> Result<Validator, SchemaError> {
    let schema: Value =
        serde_json::from_str(SCHEMA_SOURCE).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
    jsonschema::validator_for(&schema).map_err(|e| SchemaError::Compile(e.to_string()))
}

/// Check an override document, collecting every violation.
///
/// Each message names the offending instance path.
pub fn validate_config_schema(overrides: &Value) -> Result<(), Vec<String>> {
    let validator = VALIDATOR
        .get_or_init(compile)
        .as_ref()
        .map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(overrides)
        .map(|error| format!("{}: {}", error.instance_path, error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
