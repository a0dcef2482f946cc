//! PostgreSQL persistence adapters built on Diesel.
//!
//! Each repository checks out one pooled connection per port call. Row
//! structs in `models` never leave this module.

mod diesel_category_repository;
mod diesel_comment_repository;
mod diesel_directory_repository;
mod diesel_helpers;
mod diesel_rating_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_directory_repository::DieselDirectoryRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError,
};
