use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Every failure the gateway can report, normalized into four kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Coarse classification of an `ApiError`, for UI routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Server,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Auth(_) => ErrorKind::Auth,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Server { .. } => ErrorKind::Server,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Text suitable for showing to the admin.
    ///
    /// Validation messages come from the backend and are shown verbatim;
    /// the other kinds get a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Auth(_) => "Your session has ended. Please log in again.".to_string(),
            ApiError::Validation(message) => message.clone(),
            ApiError::Server { .. } => "The server failed to handle the request. Please try again.".to_string(),
        }
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// Understands `{"detail": "..."}`, `{"detail": [{"msg": ".."}, ..]}`
    /// (field validation lists) and `{"message": "..."}`.
    pub fn extract_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;

        match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }

        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                Self::truncate_body(body)
            }
        });

        match status.as_u16() {
            401 | 403 => ApiError::Auth(message),
            400 | 409 | 422 => ApiError::Validation(message),
            code => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    /// A success status whose body could not be decoded.
    pub fn invalid_response(status: StatusCode, error: impl std::fmt::Display) -> Self {
        ApiError::Server {
            status: status.as_u16(),
            message: format!("Invalid response: {}", error),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return ApiError::Server {
                status: error.status().map(|s| s.as_u16()).unwrap_or(0),
                message: format!("Invalid response: {}", error),
            };
        }
        if let Some(status) = error.status() {
            return ApiError::from_status(status, "");
        }
        ApiError::Network(error.to_string())
    }
}
