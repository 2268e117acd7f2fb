//! Uniform envelopes returned by every endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful response: `{status: "success", message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        }
    }
}

/// A single rejected input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub value: Value,
}

/// Error response: `{status: "error", message, errors?}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_empty_parts() {
        let body = serde_json::to_value(ApiResponse::success(json!({"x": 1}))).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"x": 1}}));

        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, json!({"status": "success", "message": "done"}));
    }

    #[test]
    fn error_envelope_carries_field_errors() {
        let body = serde_json::to_value(ApiError::with_errors(
            "Validation failed",
            vec![FieldError {
                field: "score".to_string(),
                message: "Score must be between 0 and 100".to_string(),
                value: json!(140),
            }],
        ))
        .unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["errors"][0]["field"], "score");
        assert_eq!(body["errors"][0]["value"], 140);

        let body = serde_json::to_value(ApiError::new("Lead not found")).unwrap();
        assert!(body.get("errors").is_none());
    }
}
