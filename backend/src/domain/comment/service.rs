//! Comment thread domain service.
//!
//! Implements [`CommentThreads`]. Edits and deletes follow one authorisation
//! predicate: the caller must be the author or an administrator. The
//! predicate is evaluated before the new body is validated, so an
//! unauthorised caller always sees a permission error.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::{Comment, CommentBody, NewComment};
use crate::domain::guard::require_content;
use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, CommentThreads, ContentRepository,
    CreateCommentRequest, UpdateCommentRequest,
};
use crate::domain::{
    Actor, CallContext, CommentId, ContentId, Error, PageRequest, ServiceLimits,
};

/// Comment thread service implementing the driving port.
#[derive(Clone)]
pub struct CommentThreadService<C, N> {
    comments: Arc<C>,
    contents: Arc<N>,
    clock: Arc<dyn Clock>,
    limits: ServiceLimits,
}

impl<C, N> CommentThreadService<C, N> {
    /// Create a new service with the given repositories.
    pub fn new(
        comments: Arc<C>,
        contents: Arc<N>,
        clock: Arc<dyn Clock>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            comments,
            contents,
            clock,
            limits,
        }
    }
}

fn map_comment_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::internal(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::MissingReferent { message } => {
            Error::not_found("referenced record no longer exists")
                .with_details(json!({ "code": "missing_referent", "reason": message }))
        }
    }
}

fn comment_not_found_error(comment_id: CommentId) -> Error {
    Error::not_found("comment not found").with_details(json!({
        "commentId": comment_id,
        "code": "comment_not_found",
    }))
}

fn parent_not_found_error(parent_id: CommentId) -> Error {
    Error::not_found("parent comment not found").with_details(json!({
        "field": "parentId",
        "parentId": parent_id,
        "code": "parent_not_found",
    }))
}

fn forbidden_error(action: &str) -> Error {
    Error::forbidden(format!("not authorised to {action} this comment"))
}

impl<C, N> CommentThreadService<C, N>
where
    C: CommentRepository,
    N: ContentRepository,
{
    async fn require_comment(&self, ctx: &CallContext, id: CommentId) -> Result<Comment, Error> {
        ctx.run(self.comments.find_by_id(id), map_comment_error)
            .await?
            .ok_or_else(|| comment_not_found_error(id))
    }

    /// Load the comment and apply the owner-or-admin predicate.
    async fn authorise(
        &self,
        ctx: &CallContext,
        id: CommentId,
        actor: Actor,
        action: &str,
    ) -> Result<Comment, Error> {
        let comment = self.require_comment(ctx, id).await?;
        if actor.may_modify(comment.author_id) {
            Ok(comment)
        } else {
            debug!(
                comment_id = %id,
                caller_id = %actor.user_id,
                author_id = %comment.author_id,
                action,
                "comment permission denied"
            );
            Err(forbidden_error(action))
        }
    }

    async fn require_parent_on(
        &self,
        ctx: &CallContext,
        parent_id: CommentId,
        content_id: ContentId,
    ) -> Result<(), Error> {
        let parent = ctx
            .run(self.comments.find_by_id(parent_id), map_comment_error)
            .await?
            .ok_or_else(|| parent_not_found_error(parent_id))?;
        if parent.content_id == content_id {
            return Ok(());
        }
        debug!(%parent_id, %content_id, parent_content_id = %parent.content_id, "reply crosses content items");
        Err(
            Error::invalid_request("reply must belong to the same content as its parent")
                .with_details(json!({
                    "field": "parentId",
                    "parentId": parent_id,
                    "contentId": content_id,
                    "code": "parent_content_mismatch",
                })),
        )
    }
}

#[async_trait]
impl<C, N> CommentThreads for CommentThreadService<C, N>
where
    C: CommentRepository,
    N: ContentRepository,
{
    async fn create_comment(
        &self,
        ctx: &CallContext,
        request: CreateCommentRequest,
    ) -> Result<Comment, Error> {
        require_content(ctx, self.contents.as_ref(), request.content_id).await?;
        if let Some(parent_id) = request.parent_id {
            self.require_parent_on(ctx, parent_id, request.content_id)
                .await?;
        }
        let body = CommentBody::new(request.body)?;

        let new_comment = NewComment {
            body,
            author_id: request.author_id,
            content_id: request.content_id,
            parent_id: request.parent_id,
            created_at: self.clock.utc(),
        };
        let created = ctx
            .run(self.comments.create(&new_comment), map_comment_error)
            .await?;
        info!(
            comment_id = %created.id,
            content_id = %created.content_id,
            reply = created.is_reply(),
            "comment created"
        );
        Ok(created)
    }

    async fn update_comment(
        &self,
        ctx: &CallContext,
        request: UpdateCommentRequest,
    ) -> Result<Comment, Error> {
        self.authorise(ctx, request.id, request.actor, "edit")
            .await?;
        let body = CommentBody::new(request.body)?;
        let updated = ctx
            .run(
                self.comments
                    .update_body(request.id, &body, self.clock.utc()),
                map_comment_error,
            )
            .await?
            .ok_or_else(|| comment_not_found_error(request.id))?;
        info!(comment_id = %updated.id, "comment updated");
        Ok(updated)
    }

    async fn delete_comment(
        &self,
        ctx: &CallContext,
        id: CommentId,
        actor: Actor,
    ) -> Result<(), Error> {
        self.authorise(ctx, id, actor, "delete").await?;
        let deleted = ctx
            .run(self.comments.delete(id), map_comment_error)
            .await?;
        if !deleted {
            return Err(comment_not_found_error(id));
        }
        info!(comment_id = %id, "comment deleted with its replies");
        Ok(())
    }

    async fn get_comment(&self, ctx: &CallContext, id: CommentId) -> Result<Comment, Error> {
        self.require_comment(ctx, id).await
    }

    async fn list_by_content(
        &self,
        ctx: &CallContext,
        content_id: ContentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, Error> {
        page.validate(&self.limits)?;
        require_content(ctx, self.contents.as_ref(), content_id).await?;
        ctx.run(
            self.comments.list_by_content(content_id, page),
            map_comment_error,
        )
        .await
    }

    async fn list_replies(
        &self,
        ctx: &CallContext,
        parent_id: CommentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, Error> {
        page.validate(&self.limits)?;
        ctx.run(self.comments.find_by_id(parent_id), map_comment_error)
            .await?
            .ok_or_else(|| parent_not_found_error(parent_id))?;
        ctx.run(self.comments.list_replies(parent_id, page), map_comment_error)
            .await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
