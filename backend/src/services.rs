//! Composition of the domain services with their driven adapters.
//!
//! [`ContentServices`] hands out the three driving ports as trait objects so
//! transport layers do not name the adapter types.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::config::BackendSettings;
use crate::domain::ports::{
    CategoryHierarchy, CategoryRepository, CommentRepository, CommentThreads, ContentRepository,
    RatingRepository, RatingToggle, UserRepository,
};
use crate::domain::{
    CategoryHierarchyService, CommentThreadService, RatingToggleService, ServiceLimits,
};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselCommentRepository, DieselDirectoryRepository,
    DieselRatingRepository, PoolError,
};

/// The driving ports, wired to one set of adapters.
#[derive(Clone)]
pub struct ContentServices {
    /// Category forest management.
    pub categories: Arc<dyn CategoryHierarchy>,
    /// Comment threads.
    pub comments: Arc<dyn CommentThreads>,
    /// Like toggling and rating statistics.
    pub ratings: Arc<dyn RatingToggle>,
}

/// Repositories backing one [`ContentServices`] instance.
struct Adapters<C, M, R, D> {
    categories: Arc<C>,
    comments: Arc<M>,
    ratings: Arc<R>,
    directory: Arc<D>,
}

impl ContentServices {
    fn assemble<C, M, R, D>(
        adapters: Adapters<C, M, R, D>,
        clock: Arc<dyn Clock>,
        limits: ServiceLimits,
    ) -> Self
    where
        C: CategoryRepository + 'static,
        M: CommentRepository + 'static,
        R: RatingRepository + 'static,
        D: ContentRepository + UserRepository + 'static,
    {
        let Adapters {
            categories,
            comments,
            ratings,
            directory,
        } = adapters;
        Self {
            categories: Arc::new(CategoryHierarchyService::new(
                categories,
                Arc::clone(&clock),
                limits,
            )),
            comments: Arc::new(CommentThreadService::new(
                comments,
                Arc::clone(&directory),
                Arc::clone(&clock),
                limits,
            )),
            ratings: Arc::new(RatingToggleService::new(
                ratings,
                Arc::clone(&directory),
                directory,
                clock,
                limits,
            )),
        }
    }

    /// Services over a shared in-memory store.
    pub fn in_memory(store: InMemoryStore, clock: Arc<dyn Clock>, limits: ServiceLimits) -> Self {
        let store = Arc::new(store);
        Self::assemble(
            Adapters {
                categories: Arc::clone(&store),
                comments: Arc::clone(&store),
                ratings: Arc::clone(&store),
                directory: store,
            },
            clock,
            limits,
        )
    }

    /// Services over PostgreSQL.
    pub fn diesel(pool: DbPool, clock: Arc<dyn Clock>, limits: ServiceLimits) -> Self {
        Self::assemble(
            Adapters {
                categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
                comments: Arc::new(DieselCommentRepository::new(pool.clone())),
                ratings: Arc::new(DieselRatingRepository::new(pool.clone())),
                directory: Arc::new(DieselDirectoryRepository::new(pool)),
            },
            clock,
            limits,
        )
    }

    /// Services chosen by configuration: PostgreSQL when a database URL is
    /// set, otherwise an empty in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] when the database pool cannot be built.
    pub async fn from_settings(
        settings: &BackendSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PoolError> {
        let limits = settings.limits();
        match settings.pool_config() {
            Some(config) => {
                let pool = DbPool::new(config).await?;
                info!("content services backed by PostgreSQL");
                Ok(Self::diesel(pool, clock, limits))
            }
            None => {
                info!("content services backed by the in-memory store");
                Ok(Self::in_memory(InMemoryStore::new(), clock, limits))
            }
        }
    }
}
