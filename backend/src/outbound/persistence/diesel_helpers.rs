//! Shared Diesel error classification for the repositories.
//!
//! Each repository maps a [`DieselFailure`] onto its own port error enum, so
//! the SQLSTATE inspection lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::PageRequest;

/// What a failed statement means to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// A unique index rejected the write; carries the constraint name.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write; carries the constraint name.
    ForeignKeyViolation { constraint: Option<String> },
    /// A check constraint rejected the write.
    CheckViolation { constraint: Option<String> },
    /// A serializable transaction lost a race (SQLSTATE 40001).
    SerializationFailure,
    /// The connection dropped mid-statement.
    Connection,
    /// Anything else; the message is safe to log but not to return.
    Other { message: String },
}

impl DieselFailure {
    /// Whether the named constraint matches `name`.
    pub(crate) fn constraint_is(&self, name: &str) -> bool {
        match self {
            Self::UniqueViolation { constraint }
            | Self::ForeignKeyViolation { constraint }
            | Self::CheckViolation { constraint } => constraint.as_deref() == Some(name),
            _ => false,
        }
    }
}

/// Classify a Diesel error, emitting debug context tagged with `operation`.
pub(crate) fn classify(error: diesel::result::Error, operation: &str) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation { constraint },
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::CheckViolation => DieselFailure::CheckViolation { constraint },
                DatabaseErrorKind::SerializationFailure => DieselFailure::SerializationFailure,
                DatabaseErrorKind::ClosedConnection => DieselFailure::Connection,
                _ => DieselFailure::Other {
                    message: info.message().to_owned(),
                },
            }
        }
        other => {
            let message = other.to_string();
            debug!(%message, %operation, "diesel operation failed");
            DieselFailure::Other { message }
        }
    }
}

/// Extract a readable message from a pool error and log it.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    let message = error.into_message();
    debug!(%message, "database pool checkout failed");
    message
}

/// `LIMIT` and `OFFSET` values for a page.
pub(crate) fn page_bounds(page: PageRequest) -> Result<(i64, i64), String> {
    let offset = i64::try_from(page.offset)
        .map_err(|_| format!("page offset {} is out of range", page.offset))?;
    Ok((i64::from(page.limit), offset))
}

/// Convert loaded rows, keeping the first conversion failure.
pub(crate) fn collect_rows<R, T>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    rows.into_iter().map(convert).collect()
}
