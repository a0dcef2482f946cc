//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters. Driving
//! ports ([`CategoryHierarchy`], [`CommentThreads`], [`RatingToggle`]) are
//! implemented by the domain services and called by transport adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod category_hierarchy;
mod category_repository;
mod comment_repository;
mod comment_threads;
mod content_repository;
mod rating_repository;
mod rating_toggle;
mod user_repository;

#[cfg(test)]
pub use category_hierarchy::MockCategoryHierarchy;
pub use category_hierarchy::{CategoryHierarchy, CreateCategoryRequest, UpdateCategoryRequest};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryRepository, CategoryRepositoryError};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use comment_threads::MockCommentThreads;
pub use comment_threads::{CommentThreads, CreateCommentRequest, UpdateCommentRequest};
#[cfg(test)]
pub use content_repository::MockContentRepository;
pub use content_repository::{
    ContentRepository, ContentRepositoryError, FixtureContentRepository,
};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingRepository, RatingRepositoryError};
#[cfg(test)]
pub use rating_toggle::MockRatingToggle;
pub use rating_toggle::RatingToggle;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
