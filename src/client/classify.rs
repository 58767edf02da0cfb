//! Response classification.
//!
//! Pure functions turning a status code and raw body into the outcome of a
//! gateway call. The order of the field lists below is part of the contract.

use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::client::error::{
    ApiError, AUTHENTICATION_MESSAGE, NOT_FOUND_MESSAGE, PERMISSION_MESSAGE, SERVER_MESSAGE,
};

/// Payload fields consulted, in order, for an error message.
pub const MESSAGE_FIELDS: [&str; 3] = ["message", "detail", "error"];

/// Payload fields consulted, in order, for a login token.
pub const TOKEN_FIELDS: [&str; 2] = ["token", "access_token"];

/// Prefix of the generic message for JSON requests.
pub const REQUEST_FAILED_PREFIX: &str = "API request failed";

/// Prefix of the generic message for downloads.
pub const DOWNLOAD_FAILED_PREFIX: &str = "Download failed";

/// Parse a body as JSON. Empty and malformed bodies yield `None`.
pub fn parse_payload(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

fn non_empty_str<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Extract a human-readable message from an error payload.
///
/// Checks `message`, `detail` and `error` for a non-empty string, then
/// accepts the payload itself if it is a JSON string.
pub fn extract_message(payload: &Value) -> Option<String> {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| non_empty_str(payload, field))
        .or_else(|| payload.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Extract the token from a login payload.
pub fn extract_token(payload: &Value) -> Option<&str> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| non_empty_str(payload, field))
}

/// Build the error for a failure status.
///
/// The kind depends on the status alone; the body only supplies the message.
pub fn failure(status: StatusCode, body: Option<&[u8]>, prefix: &str) -> ApiError {
    let message = body
        .and_then(parse_payload)
        .as_ref()
        .and_then(extract_message);
    let code = status.as_u16();

    match code {
        401 => ApiError::Authentication {
            message: message.unwrap_or_else(|| AUTHENTICATION_MESSAGE.to_string()),
        },
        403 => ApiError::Permission {
            message: message.unwrap_or_else(|| PERMISSION_MESSAGE.to_string()),
        },
        404 => ApiError::NotFound {
            message: message.unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
        },
        c if c >= 500 => ApiError::Server {
            status: code,
            message: message.unwrap_or_else(|| SERVER_MESSAGE.to_string()),
        },
        _ => {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let message = message.unwrap_or_else(|| {
                format!("{prefix}: {code} {status_text}").trim_end().to_string()
            });
            ApiError::Request {
                status: code,
                status_text,
                message,
            }
        }
    }
}

/// Interpret a complete JSON response.
///
/// Success statuses return the parsed payload, or an empty object when the
/// body is empty or not JSON. Every other status is a failure.
pub fn interpret(status: StatusCode, body: &[u8]) -> Result<Value, ApiError> {
    if status.is_success() {
        Ok(parse_payload(body).unwrap_or_else(|| Value::Object(Map::new())))
    } else {
        Err(failure(status, Some(body), REQUEST_FAILED_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErrorKind;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload(br#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(parse_payload(b"[]"), Some(json!([])));
        assert_eq!(parse_payload(b""), None);
        assert_eq!(parse_payload(b"  \n"), None);
        assert_eq!(parse_payload(b"<html>oops</html>"), None);
    }

    #[test]
    fn test_extract_message_priority() {
        let payload = json!({"message": "A", "detail": "B", "error": "C"});
        assert_eq!(extract_message(&payload).as_deref(), Some("A"));

        let payload = json!({"detail": "B", "error": "C"});
        assert_eq!(extract_message(&payload).as_deref(), Some("B"));

        let payload = json!({"error": "C"});
        assert_eq!(extract_message(&payload).as_deref(), Some("C"));

        let payload = json!("bare string");
        assert_eq!(extract_message(&payload).as_deref(), Some("bare string"));

        assert_eq!(extract_message(&json!({"success": false})), None);
    }

    #[test]
    fn test_extract_message_skips_empty_and_non_string_fields() {
        let payload = json!({"message": "", "detail": {"code": 1}, "error": "C"});
        assert_eq!(extract_message(&payload).as_deref(), Some("C"));
        assert_eq!(extract_message(&json!("")), None);
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&json!({"token": "abc"})), Some("abc"));
        assert_eq!(extract_token(&json!({"access_token": "xyz"})), Some("xyz"));
        assert_eq!(
            extract_token(&json!({"token": "abc", "access_token": "xyz"})),
            Some("abc")
        );
        assert_eq!(
            extract_token(&json!({"token": "", "access_token": "xyz"})),
            Some("xyz")
        );
        assert_eq!(extract_token(&json!({"user": {}})), None);
    }

    #[test]
    fn test_status_classes() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorKind::Authentication),
            (StatusCode::FORBIDDEN, ErrorKind::Permission),
            (StatusCode::NOT_FOUND, ErrorKind::NotFound),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Server),
            (StatusCode::BAD_GATEWAY, ErrorKind::Server),
            (StatusCode::BAD_REQUEST, ErrorKind::Request),
            (StatusCode::CONFLICT, ErrorKind::Request),
            (StatusCode::NOT_MODIFIED, ErrorKind::Request),
        ];

        for (status, kind) in cases {
            let err = interpret(status, b"").unwrap_err();
            assert_eq!(err.kind(), kind, "status {status}");
        }
    }

    #[test]
    fn test_default_messages_without_body() {
        let err = interpret(StatusCode::UNAUTHORIZED, b"").unwrap_err();
        assert_eq!(err.message(), AUTHENTICATION_MESSAGE);

        let err = interpret(StatusCode::FORBIDDEN, b"").unwrap_err();
        assert_eq!(err.message(), PERMISSION_MESSAGE);

        let err = interpret(StatusCode::NOT_FOUND, b"").unwrap_err();
        assert_eq!(err.message(), NOT_FOUND_MESSAGE);

        let err = interpret(StatusCode::SERVICE_UNAVAILABLE, b"").unwrap_err();
        assert_eq!(err.message(), SERVER_MESSAGE);
    }

    #[test]
    fn test_forbidden_message_priority() {
        let err = interpret(
            StatusCode::FORBIDDEN,
            &body(json!({"message": "A", "detail": "B"})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(err.message(), "A");

        let err = interpret(StatusCode::FORBIDDEN, &body(json!({"detail": "B"}))).unwrap_err();
        assert_eq!(err.message(), "B");

        let err = interpret(StatusCode::FORBIDDEN, &body(json!("denied outright"))).unwrap_err();
        assert_eq!(err.message(), "denied outright");
    }

    #[test]
    fn test_unparsable_failure_body_gives_generic_request_error() {
        let err = interpret(StatusCode::BAD_REQUEST, b"<html>bad</html>").unwrap_err();
        match err {
            ApiError::Request {
                status,
                status_text,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(status_text, "Bad Request");
                assert_eq!(message, "API request failed: 400 Bad Request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parsed_failure_body_without_message_gives_generic_request_error() {
        let err =
            interpret(StatusCode::CONFLICT, &body(json!({"success": false}))).unwrap_err();
        assert_eq!(err.message(), "API request failed: 409 Conflict");
    }

    #[test]
    fn test_parsed_failure_body_with_error_field() {
        let err = interpret(
            StatusCode::BAD_REQUEST,
            &body(json!({"error": "Username and password are required"})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.message(), "Username and password are required");
    }

    #[test]
    fn test_success_payload_is_unchanged() {
        let payload = json!({"success": true, "files": [{"id": "1"}], "extra": null});
        let result = interpret(StatusCode::OK, &body(payload.clone())).unwrap();
        assert_eq!(result, payload);
    }

    #[test]
    fn test_success_with_unparsable_body_is_empty_object() {
        assert_eq!(interpret(StatusCode::OK, b"not json").unwrap(), json!({}));
        assert_eq!(interpret(StatusCode::NO_CONTENT, b"").unwrap(), json!({}));
    }

    #[test]
    fn test_download_prefix() {
        let err = failure(StatusCode::GONE, None, DOWNLOAD_FAILED_PREFIX);
        assert_eq!(err.message(), "Download failed: 410 Gone");
    }
}
