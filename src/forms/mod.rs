//! Request payloads accepted by the lead API and their validation.

use std::borrow::Cow;

use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

use crate::dto::api::FieldError;

pub mod leads;

/// Converts a struct field name such as `score_min` into its wire name `scoreMin`.
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Flattens validator output into `{field, message, value}` entries ordered by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut result: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = wire_name(&field);
            errs.iter().map(move |err| FieldError {
                field: field.clone(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string()),
                value: err.params.get("value").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();
    result.sort_by(|a, b| a.field.cmp(&b.field));
    result
}

/// Builds a validation error carrying the offending value.
pub(crate) fn rejected(code: &'static str, message: &'static str, value: &str) -> ValidationError {
    let mut err = ValidationError::new(code).with_message(Cow::Borrowed(message));
    err.add_param(Cow::Borrowed("value"), &value);
    err
}
