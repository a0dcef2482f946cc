//! PostgreSQL-backed comment repository.
//!
//! Reply removal relies on the `comments.parent_id` foreign key's
//! `ON DELETE CASCADE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{
    DieselFailure, classify, collect_rows, page_bounds, pool_error_message,
};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::comments;
use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentBody, CommentId, ContentId, NewComment, PageRequest};

/// Diesel-backed implementation of [`CommentRepository`].
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    CommentRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> CommentRepositoryError {
    match classify(error, operation) {
        DieselFailure::ForeignKeyViolation { constraint } => {
            CommentRepositoryError::missing_referent(
                constraint.unwrap_or_else(|| "foreign key violation".to_owned()),
            )
        }
        DieselFailure::Connection => {
            CommentRepositoryError::connection("database connection error")
        }
        DieselFailure::CheckViolation { .. } | DieselFailure::UniqueViolation { .. } => {
            CommentRepositoryError::query("constraint violation")
        }
        DieselFailure::SerializationFailure | DieselFailure::Other { .. } => {
            CommentRepositoryError::query("database error")
        }
    }
}

fn into_domain(row: CommentRow) -> Result<Comment, CommentRepositoryError> {
    row.into_domain().map_err(CommentRepositoryError::query)
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = comments::table
            .find(id.get())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "comment read"))?;
        row.map(into_domain).transpose()
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(comments::table)
            .values(NewCommentRow::from(comment))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "comment insert"))?;
        into_domain(row)
    }

    async fn update_body(
        &self,
        id: CommentId,
        body: &CommentBody,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(comments::table.find(id.get()))
            .set((
                comments::body.eq(body.as_ref()),
                comments::updated_at.eq(updated_at),
            ))
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "comment update"))?;
        row.map(into_domain).transpose()
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "comment delete"))?;
        Ok(deleted > 0)
    }

    async fn list_by_content(
        &self,
        content_id: ContentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let (limit, offset) = page_bounds(page).map_err(CommentRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = comments::table
            .filter(comments::content_id.eq(content_id.get()))
            .filter(comments::parent_id.is_null())
            .select(CommentRow::as_select())
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "comment list"))?;
        collect_rows(rows, CommentRow::into_domain).map_err(CommentRepositoryError::query)
    }

    async fn list_replies(
        &self,
        parent_id: CommentId,
        page: PageRequest,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let (limit, offset) = page_bounds(page).map_err(CommentRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = comments::table
            .filter(comments::parent_id.eq(parent_id.get()))
            .select(CommentRow::as_select())
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "reply list"))?;
        collect_rows(rows, CommentRow::into_domain).map_err(CommentRepositoryError::query)
    }
}
