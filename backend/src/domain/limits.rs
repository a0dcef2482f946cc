//! Tunable bounds consumed by the managers.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Error;

/// Default number of find/act rounds a rating toggle may take.
pub const DEFAULT_TOGGLE_MAX_ATTEMPTS: u32 = 3;
/// Default largest page a list operation returns.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
/// Default widest top-rated window, in days.
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 365;

/// Bounds applied by the managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Find/act rounds a toggle may take before reporting a conflict.
    pub toggle_max_attempts: u32,
    /// Largest accepted page `limit`.
    pub max_page_size: u32,
    /// Widest accepted top-rated window.
    pub max_window_days: u32,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            toggle_max_attempts: DEFAULT_TOGGLE_MAX_ATTEMPTS,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }
}

/// Offset pagination parameters, already parsed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of rows to return.
    pub limit: u32,
    /// Number of rows to skip.
    pub offset: u64,
}

impl PageRequest {
    /// Build a page request.
    pub fn new(limit: u32, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// First page of `limit` rows.
    pub fn first(limit: u32) -> Self {
        Self::new(limit, 0)
    }

    /// Reject a limit outside `1..=max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error carrying the accepted range.
    pub fn validate(&self, limits: &ServiceLimits) -> Result<(), Error> {
        if (1..=limits.max_page_size).contains(&self.limit) {
            return Ok(());
        }
        Err(
            Error::invalid_request(format!(
                "limit must be between 1 and {}",
                limits.max_page_size
            ))
            .with_details(json!({
                "field": "limit",
                "value": self.limit,
                "max": limits.max_page_size,
            })),
        )
    }
}
