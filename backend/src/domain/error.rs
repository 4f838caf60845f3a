//! Use-case failure payload.
//!
//! Services return [`Error`] whatever the store did underneath. The CLI
//! prints it as JSON; a future transport would map [`ErrorCode`] to its own
//! status scheme.

use serde::Serialize;
use serde_json::Value;

/// Failure category shared by every use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed identifier or a draft failing validation.
    InvalidRequest,
    /// Well-formed identifier with nothing stored under it.
    NotFound,
    /// A store constraint rejected the write.
    Conflict,
    /// The store is unreachable or the deadline expired.
    ServiceUnavailable,
    /// Anything else the store reported.
    InternalError,
}

impl ErrorCode {
    /// Snake-case name, matching the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Use-case error: a code, a message and optional structured details.
///
/// # Examples
/// ```
/// use user_management::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "user 65f1a2b3c4d5e6f708192a3b not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create an error. A blank message is replaced with a placeholder.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unspecified error".to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether repeating the call unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::ServiceUnavailable
    }

    /// Attach structured details.
    ///
    /// # Examples
    /// ```
    /// use user_management::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::not_found("user not found").with_details(json!({ "id": "abc" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests;
