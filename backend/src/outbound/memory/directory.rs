//! Content and user existence over the in-memory store.

use async_trait::async_trait;

use super::{InMemoryStore, round_trip};
use crate::domain::ports::{
    ContentRepository, ContentRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{ContentId, UserId};

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn exists(&self, content_id: ContentId) -> Result<bool, ContentRepositoryError> {
        round_trip().await;
        Ok(self.lock().contents.contains(&content_id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn exists(&self, user_id: UserId) -> Result<bool, UserRepositoryError> {
        round_trip().await;
        Ok(self.lock().users.contains(&user_id))
    }
}
