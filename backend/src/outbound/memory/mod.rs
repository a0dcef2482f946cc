//! In-memory adapter for every driven port.
//!
//! [`InMemoryStore`] mirrors the constraints of the SQL schema: unique
//! category names, a unique (user, content) rating, foreign keys on every
//! reference, cascading reply deletion, and detaching children when a
//! category is deleted. Each operation takes the store lock once, so a
//! category re-parenting write re-checks the ancestor chain atomically, just
//! as the Diesel adapter does inside its transaction.

mod categories;
mod comments;
mod directory;
mod ratings;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{
    Category, CategoryId, Comment, CommentId, ContentId, PageRequest, Rating, RatingId, UserId,
};

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeSet<UserId>,
    contents: BTreeSet<ContentId>,
    categories: BTreeMap<CategoryId, Category>,
    comments: BTreeMap<CommentId, Comment>,
    ratings: BTreeMap<RatingId, Rating>,
    last_category_id: i64,
    last_comment_id: i64,
    last_rating_id: i64,
}

/// Thread-safe in-memory store shared by clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so references to it resolve.
    pub fn add_user(&self, user_id: UserId) {
        self.lock().users.insert(user_id);
    }

    /// Register a content item so references to it resolve.
    pub fn add_content(&self, content_id: ContentId) {
        self.lock().contents.insert(content_id);
    }

    /// Number of rating rows for the pair; never more than one.
    pub fn rating_rows(&self, user_id: UserId, content_id: ContentId) -> usize {
        self.lock()
            .ratings
            .values()
            .filter(|rating| rating.user_id == user_id && rating.content_id == content_id)
            .count()
    }

    /// Overwrite a category's parent without any checks.
    ///
    /// Only useful for reproducing data corrupted by an earlier bug.
    pub fn force_parent(&self, id: CategoryId, parent_id: Option<CategoryId>) {
        if let Some(category) = self.lock().categories.get_mut(&id) {
            category.parent_id = parent_id;
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Give other tasks a chance to run between store operations, the way a
/// network round-trip would.
async fn round_trip() {
    tokio::task::yield_now().await;
}

fn page_slice<T>(rows: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    rows.skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests;
