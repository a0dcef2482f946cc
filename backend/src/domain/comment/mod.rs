//! Comments and replies on content items.
//!
//! A comment with a parent is a reply; one without is a root comment. Nesting
//! depth is unbounded, and because a parent must exist before its reply is
//! created and comments are never re-parented, threads cannot form cycles.

mod service;

pub use service::CommentThreadService;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CommentId, ContentId, Error, UserId};

/// Longest accepted comment body, in characters.
pub const MAX_COMMENT_BODY_CHARS: usize = 1000;

/// Validation failures for comment bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    /// Body is empty once trimmed.
    #[error("comment body must not be empty")]
    EmptyBody,
    /// Body exceeds [`MAX_COMMENT_BODY_CHARS`].
    #[error("comment body must be at most {max} characters (got {actual})")]
    BodyTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Submitted length.
        actual: usize,
    },
}

impl From<CommentValidationError> for Error {
    fn from(value: CommentValidationError) -> Self {
        Error::invalid_request(value.to_string())
            .with_details(json!({ "field": "body", "code": "invalid_body" }))
    }
}

/// Validated comment text.
///
/// # Examples
/// ```
/// use content_backend::domain::CommentBody;
///
/// assert!(CommentBody::new("x".repeat(1000)).is_ok());
/// assert!(CommentBody::new("x".repeat(1001)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate and wrap a comment body.
    ///
    /// # Errors
    ///
    /// Rejects blank bodies and bodies longer than [`MAX_COMMENT_BODY_CHARS`].
    pub fn new(raw: impl Into<String>) -> Result<Self, CommentValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        let actual = raw.chars().count();
        if actual > MAX_COMMENT_BODY_CHARS {
            return Err(CommentValidationError::BodyTooLong {
                max: MAX_COMMENT_BODY_CHARS,
                actual,
            });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CommentBody> for String {
    fn from(value: CommentBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentBody {
    type Error = CommentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Store-assigned identifier.
    pub id: CommentId,
    /// Comment text.
    pub body: CommentBody,
    /// Author.
    pub author_id: UserId,
    /// Content item the comment belongs to.
    pub content_id: ContentId,
    /// Comment being replied to.
    pub parent_id: Option<CommentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Whether the comment answers another comment.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Whether the comment starts a thread.
    pub fn is_root_comment(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Validated insert payload for a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Comment text.
    pub body: CommentBody,
    /// Author.
    pub author_id: UserId,
    /// Content item, already verified to exist.
    pub content_id: ContentId,
    /// Parent comment, already verified to exist on the same content.
    pub parent_id: Option<CommentId>,
    /// Server-assigned creation time, also used as the first update time.
    pub created_at: DateTime<Utc>,
}

/// Loosely-typed comment payload as submitted by clients.
///
/// Older clients send the text under `content`, newer ones under `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    /// Legacy text field.
    #[serde(default)]
    pub content: Option<String>,
    /// Current text field.
    #[serde(default)]
    pub body: Option<String>,
}

impl CommentPayload {
    /// Pick the comment text: `content` wins when both keys are present.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error when neither key is present.
    ///
    /// # Examples
    /// ```
    /// use content_backend::domain::CommentPayload;
    ///
    /// let payload = CommentPayload {
    ///     content: Some("legacy".into()),
    ///     body: Some("current".into()),
    /// };
    /// assert_eq!(payload.resolve_body().expect("text"), "legacy");
    /// ```
    pub fn resolve_body(self) -> Result<String, Error> {
        self.content.or(self.body).ok_or_else(|| {
            Error::invalid_request("comment text is required")
                .with_details(json!({ "field": "body", "code": "missing_body" }))
        })
    }
}
