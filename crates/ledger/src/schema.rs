//! Payload schema-version dispatch
//!
//! Payload validation is keyed by the event's declared `schema_version`
//! through an explicit dispatch table. Adding a schema version means adding
//! one row here; nothing inspects payload shapes reflectively at runtime.

use crate::append::AppendError;
use chronicle_core::Value;

type Validator = fn(&Value) -> Result<(), AppendError>;

/// Dispatch table: one row per supported schema version
const VALIDATORS: &[(u16, Validator)] = &[(1, validate_v1)];

/// Validate a payload under the rules of its declared schema version
pub fn validate(schema_version: u16, payload: &Value) -> Result<(), AppendError> {
    match VALIDATORS.iter().find(|(v, _)| *v == schema_version) {
        Some((_, validator)) => validator(payload),
        None => Err(AppendError::UnknownSchemaVersion {
            schema_version,
            supported: VALIDATORS.iter().map(|(v, _)| *v).collect(),
        }),
    }
}

/// Schema v1: the payload root must be a mapping
fn validate_v1(payload: &Value) -> Result<(), AppendError> {
    match payload {
        Value::Object(_) => Ok(()),
        other => Err(AppendError::InvalidPayload {
            reason: format!("payload root must be an object, got {}", other.type_name()),
        }),
    }
}
