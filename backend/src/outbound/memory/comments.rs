//! [`CommentRepository`] over the in-memory store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{InMemoryStore, page_slice, round_trip};
use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentBody, CommentId, ContentId, NewComment, PageRequest};

fn oldest_first(rows: &mut [Comment]) {
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        round_trip().await;
        Ok(self.lock().comments.get(&id).cloned())
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if !state.contents.contains(&comment.content_id) {
            return Err(CommentRepositoryError::missing_referent(format!(
                "content {}",
                comment.content_id
            )));
        }
        if !state.users.contains(&comment.author_id) {
            return Err(CommentRepositoryError::missing_referent(format!(
                "user {}",
                comment.author_id
            )));
        }
        if let Some(parent_id) = comment.parent_id {
            if !state.comments.contains_key(&parent_id) {
                return Err(CommentRepositoryError::missing_referent(format!(
                    "comment {parent_id}"
                )));
            }
        }
        state.last_comment_id += 1;
        let created = Comment {
            id: CommentId::new(state.last_comment_id),
            body: comment.body.clone(),
            author_id: comment.author_id,
            content_id: comment.content_id,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            updated_at: comment.created_at,
        };
        state.comments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_body(
        &self,
        id: CommentId,
        body: &CommentBody,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        Ok(state.comments.get_mut(&id).map(|comment| {
            comment.body = body.clone();
            comment.updated_at = updated_at;
            comment.clone()
        }))
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if !state.comments.contains_key(&id) {
            return Ok(false);
        }
        let mut doomed = BTreeSet::from([id]);
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            let replies: Vec<CommentId> = state
                .comments
                .values()
                .filter(|comment| comment.parent_id == Some(parent))
                .map(|comment| comment.id)
                .collect();
            for reply in replies {
                if doomed.insert(reply) {
                    frontier.push(reply);
                }
            }
        }
        state.comments.retain(|comment_id, _| !doomed.contains(comment_id));
        Ok(true)
    }

    async fn list_by_content(
        &self,
        content_id: ContentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        round_trip().await;
        let mut roots: Vec<Comment> = self
            .lock()
            .comments
            .values()
            .filter(|comment| comment.content_id == content_id && comment.is_root_comment())
            .cloned()
            .collect();
        oldest_first(&mut roots);
        Ok(page_slice(roots.into_iter(), page))
    }

    async fn list_replies(
        &self,
        parent_id: CommentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        round_trip().await;
        let mut replies: Vec<Comment> = self
            .lock()
            .comments
            .values()
            .filter(|comment| comment.parent_id == Some(parent_id))
            .cloned()
            .collect();
        oldest_first(&mut replies);
        Ok(page_slice(replies.into_iter(), page))
    }
}
