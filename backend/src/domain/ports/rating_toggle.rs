//! Driving port for "like" ratings.

use async_trait::async_trait;

use crate::domain::{
    Actor, CallContext, ContentId, ContentRatingCount, Error, Rating, RatingId, RatingStats,
    ToggleOutcome, UserId,
};

/// Driving port for the like toggle and its read paths.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingToggle: Send + Sync {
    /// Flip the caller's like on a content item.
    ///
    /// Unrated becomes liked ([`ToggleOutcome::Created`]); liked becomes
    /// unrated ([`ToggleOutcome::Removed`]).
    ///
    /// # Errors
    ///
    /// Missing user or content (not found); persistent contention with
    /// concurrent toggles (conflict).
    async fn toggle_like(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<ToggleOutcome, Error>;

    /// Delete a rating. Only its owner or an admin may delete.
    ///
    /// # Errors
    ///
    /// Missing rating (not found), caller not permitted (forbidden).
    async fn delete_rating(&self, ctx: &CallContext, id: RatingId, actor: Actor)
    -> Result<(), Error>;

    /// The user's current rating on a content item, if they like it.
    ///
    /// # Errors
    ///
    /// Store failures only.
    async fn get_user_rating(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Option<Rating>, Error>;

    /// Like count for a content item.
    ///
    /// # Errors
    ///
    /// Missing content (not found).
    async fn stats_by_content(
        &self,
        ctx: &CallContext,
        content_id: ContentId,
    ) -> Result<RatingStats, Error>;

    /// Most-liked content within the last `window_days` days.
    ///
    /// # Errors
    ///
    /// `limit` or `window_days` out of range (invalid request).
    async fn top_rated_content_ids(
        &self,
        ctx: &CallContext,
        limit: u32,
        window_days: u32,
    ) -> Result<Vec<ContentRatingCount>, Error>;
}
