//! [`RatingRepository`] over the in-memory store.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{InMemoryStore, round_trip};
use crate::domain::ports::{RatingRepository, RatingRepositoryError};
use crate::domain::{ContentId, ContentRatingCount, NewRating, Rating, RatingId, UserId};

#[async_trait]
impl RatingRepository for InMemoryStore {
    async fn find_by_id(&self, id: RatingId) -> Result<Option<Rating>, RatingRepositoryError> {
        round_trip().await;
        Ok(self.lock().ratings.get(&id).cloned())
    }

    async fn find_by_user_and_content(
        &self,
        user_id: UserId,
        content_id: ContentId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        round_trip().await;
        Ok(self
            .lock()
            .ratings
            .values()
            .find(|rating| rating.user_id == user_id && rating.content_id == content_id)
            .cloned())
    }

    async fn create(&self, rating: &NewRating) -> Result<Rating, RatingRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if !state.users.contains(&rating.user_id) {
            return Err(RatingRepositoryError::missing_referent(format!(
                "user {}",
                rating.user_id
            )));
        }
        if !state.contents.contains(&rating.content_id) {
            return Err(RatingRepositoryError::missing_referent(format!(
                "content {}",
                rating.content_id
            )));
        }
        let taken = state.ratings.values().any(|existing| {
            existing.user_id == rating.user_id && existing.content_id == rating.content_id
        });
        if taken {
            return Err(RatingRepositoryError::duplicate(
                rating.user_id,
                rating.content_id,
            ));
        }
        state.last_rating_id += 1;
        let created = Rating {
            id: RatingId::new(state.last_rating_id),
            user_id: rating.user_id,
            content_id: rating.content_id,
            value: rating.value,
            created_at: rating.created_at,
            updated_at: rating.created_at,
        };
        state.ratings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete(&self, id: RatingId) -> Result<bool, RatingRepositoryError> {
        round_trip().await;
        Ok(self.lock().ratings.remove(&id).is_some())
    }

    async fn count_for_content(&self, content_id: ContentId) -> Result<u64, RatingRepositoryError> {
        round_trip().await;
        let count = self
            .lock()
            .ratings
            .values()
            .filter(|rating| rating.content_id == content_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn top_rated_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ContentRatingCount>, RatingRepositoryError> {
        round_trip().await;
        let mut counts: BTreeMap<ContentId, u64> = BTreeMap::new();
        for rating in self
            .lock()
            .ratings
            .values()
            .filter(|rating| rating.created_at >= since)
        {
            *counts.entry(rating.content_id).or_default() += 1;
        }
        let mut ranked: Vec<ContentRatingCount> = counts
            .into_iter()
            .map(|(content_id, rating_count)| ContentRatingCount {
                content_id,
                rating_count,
            })
            .collect();
        ranked.sort_by_key(|entry| (Reverse(entry.rating_count), entry.content_id));
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }
}
