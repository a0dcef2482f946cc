//! Port for rating persistence.
//!
//! Adapters must enforce at most one rating per (user, content) pair and
//! report a second insert as [`RatingRepositoryError::Duplicate`]. The toggle
//! manager relies on that signal to recover from concurrent toggles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContentId, ContentRatingCount, NewRating, Rating, RatingId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingRepositoryError for "rating repository" {
        /// The user already rated the content.
        Duplicate { user_id: UserId, content_id: ContentId } =>
            "user {user_id} already rated content {content_id}",
        /// The referenced user or content vanished before insert.
        MissingReferent { message: String } =>
            "rating references a missing record: {message}",
    }
}

/// Port for rating storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Fetch a rating by id.
    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError>;

    /// Fetch the rating a user gave a content item, if any.
    async fn find_by_user_and_content(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Option<Rating>, RatingRepositoryError>;

    /// Insert a rating, failing with `Duplicate` when the pair is taken.
    async fn create(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError>;

    /// Delete a rating by id.
    ///
    /// Returns `false` when no row was deleted.
    async fn delete(&self, id: RatingId) -> Result<bool, RatingRepositoryError>;

    /// Number of ratings on a content item.
    async fn count_for_content(&self, content_id: ContentId) -> Result<u64, RatingRepositoryError>;

    /// Content items with the most ratings created at or after `since`.
    ///
    /// Ordered by count descending, then content id ascending.
    async fn top_rated_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ContentRatingCount>, RatingRepositoryError>;
}
