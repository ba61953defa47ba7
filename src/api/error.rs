use reqwest::StatusCode;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please login again.";
pub const CONNECTION_MESSAGE: &str =
    "Unable to connect to server. Please check if the backend is running.";
pub const MISSING_TOKEN_MESSAGE: &str = "Invalid response from server - no token received";

/// How a caller should react to a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local input was rejected; show it next to the field.
    Validation,
    /// The server refused the token; the session is already cleared.
    Unauthorized,
    /// Anything else; show a notice and let the user retry.
    Transport,
}

#[derive(Debug)]
pub enum ApiError {
    /// Input failed local checks; no request was sent.
    Validation(String),
    /// The server answered 401 or 403.
    Unauthorized,
    /// The request never got a response.
    Connection(reqwest::Error),
    /// Non-success status other than 401/403.
    Status {
        status: StatusCode,
        message: String,
    },
    /// Login succeeded but the body carried no token.
    MissingToken,
    /// A success response whose body could not be decoded.
    MalformedResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::Connection(_)
            | ApiError::Status { .. }
            | ApiError::MissingToken
            | ApiError::MalformedResponse(_) => ErrorKind::Transport,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Build the error for a failed status, preferring whatever message the
    /// server put in the body.
    pub(crate) fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| extract_error_message(&value))
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Status { status, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(message) => write!(f, "{message}"),
            ApiError::Unauthorized => write!(f, "{UNAUTHORIZED_MESSAGE}"),
            ApiError::Connection(_) => write!(f, "{CONNECTION_MESSAGE}"),
            ApiError::Status { message, .. } => write!(f, "{message}"),
            ApiError::MissingToken => write!(f, "{MISSING_TOKEN_MESSAGE}"),
            ApiError::MalformedResponse(message) => {
                write!(f, "Invalid response from server: {message}")
            }
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Connection(err) => Some(err),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of a DRF-style error body.
///
/// Probes `detail`, then `message`, then the first entry of
/// `non_field_errors`. Empty strings are skipped.
pub fn extract_error_message(body: &Value) -> Option<String> {
    let non_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    non_empty(body.get("detail"))
        .or_else(|| non_empty(body.get("message")))
        .or_else(|| {
            body.get("non_field_errors")
                .and_then(Value::as_array)
                .and_then(|errors| non_empty(errors.first()))
        })
}
