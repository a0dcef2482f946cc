//! Port for comment persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Comment, CommentBody, CommentId, ContentId, NewComment, PageRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError for "comment repository" {
        /// A referenced content item, author or parent vanished before insert.
        MissingReferent { message: String } =>
            "comment references a missing record: {message}",
    }
}

/// Port for comment storage and retrieval.
///
/// Deleting a comment removes its replies as well; adapters implement the
/// cascade (`ON DELETE CASCADE` or equivalent).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Fetch a comment by id.
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Insert a new comment.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Replace a comment's body.
    ///
    /// Returns `None` when the comment no longer exists.
    async fn update_body(
        &self,
        id: CommentId,
        body: &CommentBody,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Delete a comment and, transitively, its replies.
    ///
    /// Returns `false` when no row was deleted.
    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError>;

    /// Root comments on a content item, oldest first.
    async fn list_by_content(
        &self,
        content_id: ContentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError>;

    /// Direct replies to a comment, oldest first.
    async fn list_replies(
        &self,
        parent_id: CommentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError>;
}
