//! "Like" ratings on content items.
//!
//! A (user, content) pair is either unrated (no row) or liked (one row). The
//! persisted value column accepts 1 to 5 for compatibility with older rows,
//! but every row counts as a like and the service only ever writes
//! [`RatingValue::LIKE`].

mod service;

pub use service::RatingToggleService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentId, RatingId, UserId};

/// Stored rating value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct RatingValue(i16);

/// Value outside the persisted 1 to 5 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating value must be between 1 and 5 (got {0})")]
pub struct InvalidRatingValue(pub i16);

impl RatingValue {
    /// The single value written by the like toggle.
    pub const LIKE: Self = Self(1);

    /// Validate a stored value.
    ///
    /// # Errors
    ///
    /// Rejects values outside `1..=5`.
    pub fn new(raw: i16) -> Result<Self, InvalidRatingValue> {
        if (1..=5).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidRatingValue(raw))
        }
    }

    /// Raw stored value.
    pub fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = InvalidRatingValue;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i16 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

/// A user's like on a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Store-assigned identifier.
    pub id: RatingId,
    /// User who liked the content.
    pub user_id: UserId,
    /// Liked content item.
    pub content_id: ContentId,
    /// Stored value.
    pub value: RatingValue,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    /// User who likes the content.
    pub user_id: UserId,
    /// Liked content item.
    pub content_id: ContentId,
    /// Stored value.
    pub value: RatingValue,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl NewRating {
    /// Like payload for the pair.
    pub fn like(user_id: UserId, content_id: ContentId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            content_id,
            value: RatingValue::LIKE,
            created_at,
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ToggleOutcome {
    /// Unrated became liked.
    Created {
        /// The new rating row.
        rating: Rating,
    },
    /// Liked became unrated.
    Removed {
        /// Id of the deleted row.
        rating_id: RatingId,
    },
}

impl ToggleOutcome {
    /// Whether the pair is liked after the toggle.
    pub fn is_liked(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Aggregate likes for one content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    /// Content item.
    pub content_id: ContentId,
    /// Number of users who like it.
    pub like_count: u64,
}

/// Like count for one content item within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRatingCount {
    /// Content item.
    pub content_id: ContentId,
    /// Likes created inside the window.
    pub rating_count: u64,
}
