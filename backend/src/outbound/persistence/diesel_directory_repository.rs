//! PostgreSQL-backed existence checks for users and content items.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{DieselFailure, classify, pool_error_message};
use super::pool::DbPool;
use super::schema::{contents, users};
use crate::domain::ports::{
    ContentRepository, ContentRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{ContentId, UserId};

/// Diesel-backed implementation of [`ContentRepository`] and
/// [`UserRepository`].
#[derive(Clone)]
pub struct DieselDirectoryRepository {
    pool: DbPool,
}

impl DieselDirectoryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn is_connection(error: diesel::result::Error, operation: &str) -> bool {
    matches!(classify(error, operation), DieselFailure::Connection)
}

#[async_trait]
impl ContentRepository for DieselDirectoryRepository {
    async fn exists(&self, content_id: ContentId) -> Result<bool, ContentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ContentRepositoryError::connection(pool_error_message(err)))?;
        select(exists(contents::table.find(content_id.get())))
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_connection(err, "content lookup") {
                    ContentRepositoryError::connection("database connection error")
                } else {
                    ContentRepositoryError::query("database error")
                }
            })
    }
}

#[async_trait]
impl UserRepository for DieselDirectoryRepository {
    async fn exists(&self, user_id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| UserRepositoryError::connection(pool_error_message(err)))?;
        select(exists(users::table.find(user_id.get())))
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_connection(err, "user lookup") {
                    UserRepositoryError::connection("database connection error")
                } else {
                    UserRepositoryError::query("database error")
                }
            })
    }
}
