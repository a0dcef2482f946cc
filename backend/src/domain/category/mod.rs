//! Category tree: nodes, names and parent changes.
//!
//! Categories form a forest through their optional parent reference. The
//! service in [`service`] owns the rule that no category is its own ancestor;
//! the types here validate individual fields.

mod ancestry;
mod service;

pub use ancestry::{AncestorWalk, WalkOutcome, WalkStep};
pub use service::CategoryHierarchyService;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, Error};

/// Longest accepted category name, in characters.
pub const MAX_CATEGORY_NAME_CHARS: usize = 100;

/// Validation failures for category fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryValidationError {
    /// Name is empty once trimmed.
    #[error("category name must not be empty")]
    EmptyName,
    /// Name exceeds [`MAX_CATEGORY_NAME_CHARS`].
    #[error("category name must be at most {max} characters (got {actual})")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Submitted length.
        actual: usize,
    },
}

impl From<CategoryValidationError> for Error {
    fn from(value: CategoryValidationError) -> Self {
        Error::invalid_request(value.to_string())
            .with_details(serde_json::json!({ "field": "name", "code": "invalid_name" }))
    }
}

/// Unique, case-sensitive category name.
///
/// # Examples
/// ```
/// use content_backend::domain::CategoryName;
///
/// let name = CategoryName::new("Movies").expect("valid name");
/// assert_eq!(name.as_ref(), "Movies");
/// assert!(CategoryName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Validate and wrap a category name.
    ///
    /// # Errors
    ///
    /// Rejects blank names and names longer than [`MAX_CATEGORY_NAME_CHARS`].
    pub fn new(raw: impl Into<String>) -> Result<Self, CategoryValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }
        let actual = raw.chars().count();
        if actual > MAX_CATEGORY_NAME_CHARS {
            return Err(CategoryValidationError::NameTooLong {
                max: MAX_CATEGORY_NAME_CHARS,
                actual,
            });
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CategoryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A node in the category forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Store-assigned identifier.
    pub id: CategoryId,
    /// Unique name.
    pub name: CategoryName,
    /// Free-text description.
    pub description: String,
    /// Parent node; `None` for a root.
    pub parent_id: Option<CategoryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether the category sits at the top of its tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Validated insert payload for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Unique name.
    pub name: CategoryName,
    /// Free-text description.
    pub description: String,
    /// Parent node, already verified to exist.
    pub parent_id: Option<CategoryId>,
    /// Server-assigned creation time, also used as the first update time.
    pub created_at: DateTime<Utc>,
}

/// Requested change to a category's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "parentId")]
pub enum ParentUpdate {
    /// Leave the parent unchanged.
    #[default]
    Keep,
    /// Make the category a root.
    Detach,
    /// Re-parent under the given category.
    Attach(CategoryId),
}

impl ParentUpdate {
    /// Interpret the nullable parent field of an update.
    ///
    /// An absent field keeps the parent, an explicit null detaches.
    pub fn from_nullable(field: Option<Option<CategoryId>>) -> Self {
        match field {
            None => Self::Keep,
            Some(None) => Self::Detach,
            Some(Some(parent_id)) => Self::Attach(parent_id),
        }
    }

    /// Whether the update touches the parent at all.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Keep)
    }
}

/// Validated field changes applied in a single store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChanges {
    /// Replacement name.
    pub name: Option<CategoryName>,
    /// Replacement description.
    pub description: Option<String>,
    /// Parent change.
    pub parent: ParentUpdate,
    /// Server-assigned update time.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_names_are_rejected(#[case] raw: &str) {
        assert_eq!(CategoryName::new(raw), Err(CategoryValidationError::EmptyName));
    }

    #[rstest]
    fn name_length_counts_characters() {
        let exact = "é".repeat(MAX_CATEGORY_NAME_CHARS);
        assert!(CategoryName::new(exact).is_ok());

        let over = "a".repeat(MAX_CATEGORY_NAME_CHARS + 1);
        assert_eq!(
            CategoryName::new(over),
            Err(CategoryValidationError::NameTooLong {
                max: MAX_CATEGORY_NAME_CHARS,
                actual: MAX_CATEGORY_NAME_CHARS + 1,
            })
        );
    }

    #[rstest]
    fn names_are_case_sensitive() {
        let lower = CategoryName::new("movies").expect("valid");
        let upper = CategoryName::new("Movies").expect("valid");
        assert_ne!(lower, upper);
    }

    #[rstest]
    #[case(None, ParentUpdate::Keep)]
    #[case(Some(None), ParentUpdate::Detach)]
    #[case(Some(Some(CategoryId::new(3))), ParentUpdate::Attach(CategoryId::new(3)))]
    fn nullable_parent_field_maps_to_update(
        #[case] field: Option<Option<CategoryId>>,
        #[case] expected: ParentUpdate,
    ) {
        assert_eq!(ParentUpdate::from_nullable(field), expected);
    }
}
