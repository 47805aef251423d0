//! Translation of platform error bodies into [`PlatformError`].
//!
//! The platform answers failed calls with
//! `{"statusCode": 409, "message": "...", "errors": [{"code": "...", ...}]}`.
//! Callers only ever see the typed result; nothing above this module
//! inspects message text.

use serde::Deserialize;

use super::{PlatformError, ValidationError};

/// Message the platform used for duplicate emails before error codes were
/// inspected. Still matched when a response carries no `errors` array.
pub const DUPLICATE_EMAIL_MESSAGE: &str =
    "There is already an existing customer with the provided email.";

/// Error response body.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status repeated in the body.
    #[serde(default)]
    pub status_code: Option<u16>,
    /// Top-level message.
    #[serde(default)]
    pub message: String,
    /// Individual errors.
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

/// A single error in an [`ErrorResponse`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorObject {
    /// Machine-readable code, e.g. `ConcurrentModification`.
    #[serde(default)]
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Offending field (`DuplicateField`, `InvalidField`).
    #[serde(default)]
    pub field: Option<String>,
    /// Offending value (`DuplicateField`).
    #[serde(default)]
    pub duplicate_value: Option<serde_json::Value>,
    /// Current resource version (`ConcurrentModification`).
    #[serde(default)]
    pub current_version: Option<i64>,
}

/// Map a non-success response to a typed error.
///
/// `body` is the raw response text; unparseable bodies fall back to
/// [`PlatformError::Api`] with the (truncated) text as message.
#[must_use]
pub fn map_error_response(status: u16, body: &str) -> PlatformError {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_else(|_| ErrorResponse {
        status_code: Some(status),
        message: body.chars().take(200).collect(),
        errors: Vec::new(),
    });

    for error in &parsed.errors {
        match error.code.as_str() {
            "ConcurrentModification" => {
                return PlatformError::VersionConflict {
                    current_version: error.current_version,
                };
            }
            "ResourceNotFound" => return PlatformError::NotFound(error.message.clone()),
            "DuplicateField" => {
                return PlatformError::Validation(ValidationError::DuplicateField {
                    field: error.field.clone().unwrap_or_default(),
                    value: error.duplicate_value.as_ref().map(display_value),
                });
            }
            "InvalidField" | "RequiredField" | "InvalidInput" | "InvalidJsonInput" => {
                return PlatformError::Validation(ValidationError::InvalidField {
                    field: error.field.clone(),
                    message: error.message.clone(),
                });
            }
            "InvalidCredentials" | "InvalidCurrentPassword" => {
                return PlatformError::InvalidCredentials(error.message.clone());
            }
            "invalid_token" | "insufficient_scope" | "invalid_client" => {
                return PlatformError::Unauthorized(error.message.clone());
            }
            _ => {}
        }
    }

    if is_legacy_duplicate_email(&parsed.message) {
        return PlatformError::Validation(ValidationError::DuplicateField {
            field: "email".to_string(),
            value: None,
        });
    }

    match status {
        404 => PlatformError::NotFound(parsed.message),
        409 => PlatformError::VersionConflict {
            current_version: None,
        },
        401 | 403 => PlatformError::Unauthorized(parsed.message),
        _ => PlatformError::Api {
            status,
            message: parsed.message,
        },
    }
}

/// Older API deployments sent only the message, sometimes with the resource
/// name substituted ("existing api with the provided email").
fn is_legacy_duplicate_email(message: &str) -> bool {
    message == DUPLICATE_EMAIL_MESSAGE
        || (message.starts_with("There is already an existing ")
            && message.ends_with(" with the provided email."))
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_concurrent_modification_maps_to_version_conflict() {
        let body = json!({
            "statusCode": 409,
            "message": "Object 7d3a has a different version than expected. Expected: 3 - Actual: 4.",
            "errors": [{
                "code": "ConcurrentModification",
                "message": "Object 7d3a has a different version than expected. Expected: 3 - Actual: 4.",
                "currentVersion": 4
            }]
        });
        let err = map_error_response(409, &body.to_string());
        assert!(matches!(
            err,
            PlatformError::VersionConflict {
                current_version: Some(4)
            }
        ));
    }

    #[test]
    fn test_duplicate_field_maps_to_validation() {
        let body = json!({
            "statusCode": 400,
            "message": "There is already an existing customer with the provided email.",
            "errors": [{
                "code": "DuplicateField",
                "message": "There is already an existing customer with the provided email.",
                "duplicateValue": "jane@example.com",
                "field": "email"
            }]
        });
        let err = map_error_response(400, &body.to_string());
        assert!(err.is_duplicate_email());
        match err {
            PlatformError::Validation(ValidationError::DuplicateField { field, value }) => {
                assert_eq!(field, "email");
                assert_eq!(value.as_deref(), Some("jane@example.com"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_message_without_codes_is_duplicate_email() {
        let body = json!({
            "statusCode": 400,
            "message": "There is already an existing api with the provided email."
        });
        assert!(map_error_response(400, &body.to_string()).is_duplicate_email());
    }

    #[test]
    fn test_other_messages_are_not_duplicate_email() {
        let body = json!({ "statusCode": 400, "message": "Request body does not contain valid JSON." });
        let err = map_error_response(400, &body.to_string());
        assert!(!err.is_duplicate_email());
        assert!(matches!(err, PlatformError::Api { status: 400, .. }));
    }

    #[test]
    fn test_resource_not_found() {
        let body = json!({
            "statusCode": 404,
            "message": "The Resource with ID 'cart-9' was not found.",
            "errors": [{ "code": "ResourceNotFound", "message": "The Resource with ID 'cart-9' was not found." }]
        });
        let err = map_error_response(404, &body.to_string());
        assert!(matches!(err, PlatformError::NotFound(ref m) if m.contains("cart-9")));
    }

    #[test]
    fn test_invalid_credentials() {
        let body = json!({
            "statusCode": 400,
            "message": "Account with the given credentials not found.",
            "errors": [{ "code": "InvalidCredentials", "message": "Account with the given credentials not found." }]
        });
        assert!(matches!(
            map_error_response(400, &body.to_string()),
            PlatformError::InvalidCredentials(_)
        ));
    }

    #[test]
    fn test_non_json_body_falls_back_to_status() {
        assert!(matches!(
            map_error_response(502, "<html>Bad Gateway</html>"),
            PlatformError::Api { status: 502, ref message } if message.contains("Bad Gateway")
        ));
        assert!(matches!(
            map_error_response(404, ""),
            PlatformError::NotFound(_)
        ));
    }
}
