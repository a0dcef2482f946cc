//! Port for user existence checks.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError for "user repository" {}
}

/// Read-only view of user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether a user with this id exists.
    async fn exists(&self, user_id: UserId) -> Result<bool, UserRepositoryError>;
}

/// Fixture implementation reporting every user as present.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn exists(&self, _user_id: UserId) -> Result<bool, UserRepositoryError> {
        Ok(true)
    }
}
