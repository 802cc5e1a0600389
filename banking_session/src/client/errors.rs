use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message used when a failure carries no usable body.
pub(crate) const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Message used when the server could not be reached at all.
pub(crate) const CONNECTION_FAILURE_MESSAGE: &str = "Could not connect to the server";

/// Status reported for failures that never produced an HTTP response.
pub(crate) const TRANSPORT_FAILURE_STATUS: u16 = 500;

/// Structured failure returned by every backend call.
///
/// Non-2xx responses and transport errors both end up here; nothing panics or
/// escapes the client boundary in another form.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[error("{message} (status {status})")]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
    pub code: Option<String>,
    pub details: Option<Value>,
}

impl ApiFailure {
    /// Builds a failure from a non-2xx response body.
    ///
    /// The backend's `message` field is user-facing and is preferred. The
    /// code comes from `code`, or from `error`, which is what the backend's
    /// global exception handler sets.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let details = parsed
            .as_ref()
            .and_then(|v| v.get("details"))
            .filter(|d| !d.is_null())
            .cloned();

        Self {
            status,
            message: field("message").unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            code: field("code").or_else(|| field("error")),
            details,
        }
    }

    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "TIMEOUT"
        } else if err.is_connect() {
            "CONNECTION"
        } else {
            "TRANSPORT"
        };

        Self {
            status: err
                .status()
                .map(|s| s.as_u16())
                .unwrap_or(TRANSPORT_FAILURE_STATUS),
            message: CONNECTION_FAILURE_MESSAGE.to_string(),
            code: Some(code.to_string()),
            details: Some(Value::String(err.to_string())),
        }
    }

    /// A 2xx response whose body did not match the expected shape.
    pub(crate) fn decode(status: u16, err: &serde_json::Error) -> Self {
        Self {
            status,
            message: "Unexpected response from the server".to_string(),
            code: Some("DECODE".to_string()),
            details: Some(Value::String(err.to_string())),
        }
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            message: message.into(),
            code: Some("INVALID_REQUEST".to_string()),
            details: None,
        }
    }
}

/// Result of a backend call: `Ok` on 2xx, a structured failure otherwise.
pub type ApiResult<T> = Result<T, ApiFailure>;
