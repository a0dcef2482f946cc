//! Backend settings loaded via OrthoConfig.
//!
//! Values come from `CONTENT_BACKEND_*` environment variables, CLI flags and
//! configuration files. The domain never sees this type; it receives the
//! plain [`ServiceLimits`] produced by [`BackendSettings::limits`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_WINDOW_DAYS, DEFAULT_TOGGLE_MAX_ATTEMPTS, ServiceLimits,
};
use crate::outbound::persistence::PoolConfig;

/// Runtime configuration for the content backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CONTENT_BACKEND")]
pub struct BackendSettings {
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Seconds to wait for a pooled connection.
    #[ortho_config(default = 30)]
    pub pool_timeout_secs: u64,
    /// Attempts a like toggle makes before reporting contention.
    #[ortho_config(default = 3)]
    pub toggle_max_attempts: u32,
    /// Largest accepted page `limit`.
    #[ortho_config(default = 100)]
    pub max_page_size: u32,
    /// Largest accepted top-rated window, in days.
    #[ortho_config(default = 365)]
    pub max_window_days: u32,
}

impl BackendSettings {
    /// Limits consumed by the domain services.
    ///
    /// Zero values fall back to the defaults so a blank variable cannot
    /// disable a bound.
    pub fn limits(&self) -> ServiceLimits {
        ServiceLimits {
            toggle_max_attempts: non_zero_or(
                self.toggle_max_attempts,
                DEFAULT_TOGGLE_MAX_ATTEMPTS,
            ),
            max_page_size: non_zero_or(self.max_page_size, DEFAULT_MAX_PAGE_SIZE),
            max_window_days: non_zero_or(self.max_window_days, DEFAULT_MAX_WINDOW_DAYS),
        }
    }

    /// Pool configuration, or `None` when no database URL is set.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size)
                .with_connection_timeout(Duration::from_secs(self.pool_timeout_secs))
        })
    }
}

fn non_zero_or<T: PartialEq + Default>(value: T, fallback: T) -> T {
    if value == T::default() {
        fallback
    } else {
        value
    }
}
