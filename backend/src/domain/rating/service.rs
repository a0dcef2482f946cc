//! Rating toggle domain service.
//!
//! Implements [`RatingToggle`]. The toggle is a find-then-act sequence; the
//! repository's unique (user, content) constraint turns a lost race into a
//! signal rather than a duplicate row:
//!
//! - insert reports `Duplicate`: a concurrent toggle liked first, so re-read
//!   and remove (two toggles in series);
//! - delete affects no row: a concurrent toggle removed it first, so re-read
//!   and create.
//!
//! The loop is bounded by `toggle_max_attempts`; exhausting it is a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{ContentRatingCount, NewRating, Rating, RatingStats, ToggleOutcome};
use crate::domain::guard::{require_content, require_user};
use crate::domain::ports::{
    ContentRepository, RatingRepository, RatingRepositoryError, RatingToggle, UserRepository,
};
use crate::domain::{Actor, CallContext, ContentId, Error, RatingId, ServiceLimits, UserId};

/// Rating toggle service implementing the driving port.
#[derive(Clone)]
pub struct RatingToggleService<R, N, U> {
    ratings: Arc<R>,
    contents: Arc<N>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    limits: ServiceLimits,
}

impl<R, N, U> RatingToggleService<R, N, U> {
    /// Create a new service with the given repositories.
    pub fn new(
        ratings: Arc<R>,
        contents: Arc<N>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            ratings,
            contents,
            users,
            clock,
            limits,
        }
    }
}

fn map_rating_error(error: RatingRepositoryError) -> Error {
    match error {
        RatingRepositoryError::Connection { message } => {
            Error::internal(format!("rating repository unavailable: {message}"))
        }
        RatingRepositoryError::Query { message } => {
            Error::internal(format!("rating repository error: {message}"))
        }
        RatingRepositoryError::Duplicate {
            user_id,
            content_id,
        } => Error::conflict("rating already exists").with_details(json!({
            "userId": user_id,
            "contentId": content_id,
            "code": "duplicate_rating",
        })),
        RatingRepositoryError::MissingReferent { message } => {
            Error::not_found("referenced record no longer exists")
                .with_details(json!({ "code": "missing_referent", "reason": message }))
        }
    }
}

fn rating_not_found_error(rating_id: RatingId) -> Error {
    Error::not_found("rating not found").with_details(json!({
        "ratingId": rating_id,
        "code": "rating_not_found",
    }))
}

fn out_of_range_error(field: &str, value: u32, max: u32) -> Error {
    Error::invalid_request(format!("{field} must be between 1 and {max}")).with_details(json!({
        "field": field,
        "value": value,
        "max": max,
    }))
}

impl<R, N, U> RatingToggleService<R, N, U>
where
    R: RatingRepository,
    N: ContentRepository,
    U: UserRepository,
{
    /// One find-then-act round. `None` means a concurrent toggle interfered.
    async fn toggle_once(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        content_id: ContentId,
        attempt: u32,
    ) -> Result<Option<ToggleOutcome>, Error> {
        let existing = ctx
            .run(
                self.ratings.find_by_user_and_content(user_id, content_id),
                map_rating_error,
            )
            .await?;

        if let Some(rating) = existing {
            let deleted = ctx
                .run(self.ratings.delete(rating.id), map_rating_error)
                .await?;
            if deleted {
                info!(%user_id, %content_id, rating_id = %rating.id, "like removed");
                return Ok(Some(ToggleOutcome::Removed {
                    rating_id: rating.id,
                }));
            }
            warn!(%user_id, %content_id, attempt, "rating vanished before delete; re-reading");
            return Ok(None);
        }

        let new_rating = NewRating::like(user_id, content_id, self.clock.utc());
        match ctx.guard(self.ratings.create(&new_rating)).await? {
            Ok(rating) => {
                info!(%user_id, %content_id, rating_id = %rating.id, "like created");
                Ok(Some(ToggleOutcome::Created { rating }))
            }
            Err(RatingRepositoryError::Duplicate { .. }) => {
                warn!(%user_id, %content_id, attempt, "concurrent like detected; re-reading");
                Ok(None)
            }
            Err(other) => Err(map_rating_error(other)),
        }
    }
}

#[async_trait]
impl<R, N, U> RatingToggle for RatingToggleService<R, N, U>
where
    R: RatingRepository,
    N: ContentRepository,
    U: UserRepository,
{
    async fn toggle_like(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<ToggleOutcome, Error> {
        require_content(ctx, self.contents.as_ref(), content_id).await?;
        require_user(ctx, self.users.as_ref(), user_id).await?;

        let attempts = self.limits.toggle_max_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(outcome) = self.toggle_once(ctx, user_id, content_id, attempt).await? {
                return Ok(outcome);
            }
        }

        warn!(%user_id, %content_id, attempts, "like toggle gave up under contention");
        Err(
            Error::conflict("rating changed concurrently; retry the toggle").with_details(json!({
                "userId": user_id,
                "contentId": content_id,
                "attempts": attempts,
                "code": "toggle_contention",
            })),
        )
    }

    async fn delete_rating(
        &self,
        ctx: &CallContext,
        id: RatingId,
        actor: Actor,
    ) -> Result<(), Error> {
        let rating = ctx
            .run(self.ratings.find_by_id(id), map_rating_error)
            .await?
            .ok_or_else(|| rating_not_found_error(id))?;
        if !actor.may_modify(rating.user_id) {
            debug!(rating_id = %id, caller_id = %actor.user_id, "rating permission denied");
            return Err(Error::forbidden("not authorised to delete this rating"));
        }
        let deleted = ctx
            .run(self.ratings.delete(id), map_rating_error)
            .await?;
        if !deleted {
            return Err(rating_not_found_error(id));
        }
        info!(rating_id = %id, "rating deleted");
        Ok(())
    }

    async fn get_user_rating(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Option<Rating>, Error> {
        ctx.run(
            self.ratings.find_by_user_and_content(user_id, content_id),
            map_rating_error,
        )
        .await
    }

    async fn stats_by_content(
        &self,
        ctx: &CallContext,
        content_id: ContentId,
    ) -> Result<RatingStats, Error> {
        require_content(ctx, self.contents.as_ref(), content_id).await?;
        let like_count = ctx
            .run(self.ratings.count_for_content(content_id), map_rating_error)
            .await?;
        Ok(RatingStats {
            content_id,
            like_count,
        })
    }

    async fn top_rated_content_ids(
        &self,
        ctx: &CallContext,
        limit: u32,
        window_days: u32,
    ) -> Result<Vec<ContentRatingCount>, Error> {
        if !(1..=self.limits.max_page_size).contains(&limit) {
            return Err(out_of_range_error("limit", limit, self.limits.max_page_size));
        }
        if !(1..=self.limits.max_window_days).contains(&window_days) {
            return Err(out_of_range_error(
                "windowDays",
                window_days,
                self.limits.max_window_days,
            ));
        }
        let since = self.clock.utc() - TimeDelta::days(i64::from(window_days));
        ctx.run(self.ratings.top_rated_since(since, limit), map_rating_error)
            .await
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
