//! Domain-level error types.
//!
//! These errors are transport agnostic. A calling adapter maps each
//! [`ErrorCode`] to its own status envelope; classification never depends on
//! the message text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The input violates a domain rule.
    InvalidRequest,
    /// A referenced entity does not exist.
    NotFound,
    /// A uniqueness rule would be violated or a concurrent writer won.
    Conflict,
    /// The caller is neither the owner nor an administrator.
    Forbidden,
    /// Anything else: store failure, timeout, cancellation.
    InternalError,
}

/// Generic message returned in place of internal failure details.
pub const REDACTED_INTERNAL_MESSAGE: &str = "internal server error";

/// Domain error payload.
///
/// # Examples
/// ```
/// use content_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("category not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message as raised inside the domain, including internal detail.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Message safe to hand to an untrusted caller.
    ///
    /// Internal errors are redacted; every other kind exposes its message.
    ///
    /// ```
    /// use content_backend::domain::Error;
    ///
    /// let err = Error::internal("pool exhausted on db-3");
    /// assert_eq!(err.public_message(), "internal server error");
    /// ```
    pub fn public_message(&self) -> &str {
        match self.code {
            ErrorCode::InternalError => REDACTED_INTERNAL_MESSAGE,
            _ => self.message.as_str(),
        }
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use content_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}
