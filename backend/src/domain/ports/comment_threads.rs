//! Driving port for comment threads.

use async_trait::async_trait;

use crate::domain::{Actor, CallContext, Comment, CommentId, ContentId, Error, PageRequest, UserId};

/// Request to create a comment or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentRequest {
    /// Authenticated author.
    pub author_id: UserId,
    /// Content item being discussed.
    pub content_id: ContentId,
    /// Raw body text.
    pub body: String,
    /// Comment being replied to, if any.
    pub parent_id: Option<CommentId>,
}

/// Request to replace a comment's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommentRequest {
    /// Comment to edit.
    pub id: CommentId,
    /// Caller performing the edit.
    pub actor: Actor,
    /// Replacement body text.
    pub body: String,
}

/// Driving port for comments and replies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentThreads: Send + Sync {
    /// Create a comment, or a reply when `parent_id` is set.
    ///
    /// # Errors
    ///
    /// Invalid body or a parent on different content (invalid request),
    /// missing content or parent (not found).
    async fn create_comment(
        &self,
        ctx: &CallContext,
        request: CreateCommentRequest,
    ) -> Result<Comment, Error>;

    /// Replace a comment's body. Only the author or an admin may edit.
    ///
    /// # Errors
    ///
    /// Missing comment (not found), caller not permitted (forbidden), invalid
    /// body (invalid request).
    async fn update_comment(
        &self,
        ctx: &CallContext,
        request: UpdateCommentRequest,
    ) -> Result<Comment, Error>;

    /// Delete a comment and its replies. Only the author or an admin may delete.
    ///
    /// # Errors
    ///
    /// Missing comment (not found), caller not permitted (forbidden).
    async fn delete_comment(
        &self,
        ctx: &CallContext,
        id: CommentId,
        actor: Actor,
    ) -> Result<(), Error>;

    /// Fetch one comment.
    ///
    /// # Errors
    ///
    /// Missing comment (not found).
    async fn get_comment(&self, ctx: &CallContext, id: CommentId) -> Result<Comment, Error>;

    /// Root comments on a content item, oldest first.
    ///
    /// # Errors
    ///
    /// Page limit out of range (invalid request), missing content (not found).
    async fn list_by_content(
        &self,
        ctx: &CallContext,
        content_id: ContentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, Error>;

    /// Direct replies to a comment, oldest first.
    ///
    /// # Errors
    ///
    /// Page limit out of range (invalid request), missing parent (not found).
    async fn list_replies(
        &self,
        ctx: &CallContext,
        parent_id: CommentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, Error>;
}
