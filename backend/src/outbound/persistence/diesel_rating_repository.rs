//! PostgreSQL-backed rating repository.
//!
//! The `ratings_user_content_key` unique constraint is the authority on "one
//! rating per user and content item"; a violation surfaces as
//! [`RatingRepositoryError::Duplicate`] for the toggle to recover from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Timestamptz};
use diesel_async::RunQueryDsl;

use super::diesel_helpers::{DieselFailure, classify, collect_rows, pool_error_message};
use super::models::{NewRatingRow, RatingRow, TopRatedRow};
use super::pool::{DbPool, PoolError};
use super::schema::ratings;
use crate::domain::ports::{RatingRepository, RatingRepositoryError};
use crate::domain::{ContentId, ContentRatingCount, NewRating, Rating, RatingId, UserId};

const USER_CONTENT_CONSTRAINT: &str = "ratings_user_content_key";

const TOP_RATED_SQL: &str = r#"
SELECT content_id, COUNT(*) AS rating_count
FROM ratings
WHERE created_at >= $1
GROUP BY content_id
ORDER BY rating_count DESC, content_id ASC
LIMIT $2
"#;

/// Diesel-backed implementation of [`RatingRepository`].
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RatingRepositoryError {
    RatingRepositoryError::connection(pool_error_message(error))
}

fn map_failure(failure: DieselFailure) -> RatingRepositoryError {
    match failure {
        DieselFailure::ForeignKeyViolation { constraint } => RatingRepositoryError::missing_referent(
            constraint.unwrap_or_else(|| "foreign key violation".to_owned()),
        ),
        DieselFailure::Connection => RatingRepositoryError::connection("database connection error"),
        DieselFailure::UniqueViolation { .. } | DieselFailure::CheckViolation { .. } => {
            RatingRepositoryError::query("constraint violation")
        }
        DieselFailure::SerializationFailure | DieselFailure::Other { .. } => {
            RatingRepositoryError::query("database error")
        }
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> RatingRepositoryError {
    map_failure(classify(error, operation))
}

fn map_insert_error(error: diesel::result::Error, rating: &NewRating) -> RatingRepositoryError {
    let failure = classify(error, "rating insert");
    if failure.constraint_is(USER_CONTENT_CONSTRAINT) {
        return RatingRepositoryError::duplicate(rating.user_id, rating.content_id);
    }
    map_failure(failure)
}

fn into_domain(row: RatingRow) -> Result<Rating, RatingRepositoryError> {
    row.into_domain().map_err(RatingRepositoryError::query)
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ratings::table
            .find(id.get())
            .select(RatingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "rating read"))?;
        row.map(into_domain).transpose()
    }

    async fn find_by_user_and_content(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ratings::table
            .filter(ratings::user_id.eq(user_id.get()))
            .filter(ratings::content_id.eq(content_id.get()))
            .select(RatingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "rating lookup"))?;
        row.map(into_domain).transpose()
    }

    async fn create(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(ratings::table)
            .values(NewRatingRow::from(rating))
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, rating))?;
        into_domain(row)
    }

    async fn delete(&self, id: RatingId) -> Result<bool, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(ratings::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "rating delete"))?;
        Ok(deleted > 0)
    }

    async fn count_for_content(&self, content_id: ContentId) -> Result<u64, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = ratings::table
            .filter(ratings::content_id.eq(content_id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "rating count"))?;
        u64::try_from(count)
            .map_err(|_| RatingRepositoryError::query("negative rating count"))
    }

    async fn top_rated_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ContentRatingCount>, RatingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TopRatedRow> = sql_query(TOP_RATED_SQL)
            .bind::<Timestamptz, _>(since)
            .bind::<BigInt, _>(i64::from(limit))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "top rated query"))?;
        collect_rows(rows, TopRatedRow::into_domain).map_err(RatingRepositoryError::query)
    }
}
