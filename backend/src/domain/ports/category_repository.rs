//! Port for category persistence.
//!
//! The [`CategoryRepository`] trait stores the category forest. Adapters must
//! enforce name uniqueness themselves (a unique index or equivalent) and must
//! re-check the ancestor chain atomically with any re-parenting write, so a
//! concurrent update elsewhere in the tree cannot slip a cycle past the
//! manager's up-front check.

use async_trait::async_trait;

use crate::domain::{
    Category, CategoryChanges, CategoryId, CategoryName, NewCategory, PageRequest,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by category repository adapters.
    pub enum CategoryRepositoryError for "category repository" {
        /// Another category already uses the name.
        DuplicateName { name: String } =>
            "category name already exists: {name}",
        /// The requested parent does not exist.
        ParentNotFound { parent_id: CategoryId } =>
            "parent category {parent_id} does not exist",
        /// The category to update does not exist.
        NotFound { category_id: CategoryId } =>
            "category {category_id} does not exist",
        /// The re-parenting write would close a cycle.
        CircularReference { category_id: CategoryId, parent_id: CategoryId } =>
            "category {parent_id} is a descendant of category {category_id}",
        /// A concurrent transaction invalidated this one.
        Contention { message: String } =>
            "category repository contention: {message}",
    }
}

/// Port for category storage and retrieval.
///
/// # Atomic re-parenting
///
/// When `changes.parent` attaches the category to a new parent,
/// [`CategoryRepository::update`] must walk the new parent's ancestor chain
/// in the same transaction or critical section as the write, and fail with
/// [`CategoryRepositoryError::CircularReference`] if the category appears in
/// it or the chain loops.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fetch a category by id.
    async fn find_by_id(&self, id: CategoryId)
    -> Result<Option<Category>, CategoryRepositoryError>;

    /// Fetch a category by exact, case-sensitive name.
    async fn find_by_name(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, CategoryRepositoryError>;

    /// List direct children of `parent_id` (roots when `None`), ordered by name.
    async fn list_children(
        &self,
        parent_id: Option<CategoryId>,
        page: PageRequest,
    ) -> Result<Vec<Category>, CategoryRepositoryError>;

    /// Insert a new category.
    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError>;

    /// Apply validated changes, re-checking the ancestor chain when re-parenting.
    async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, CategoryRepositoryError>;

    /// Delete a category, detaching its direct children.
    ///
    /// Returns `false` when no row was deleted.
    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn circular_reference_names_both_categories() {
        let err = CategoryRepositoryError::circular_reference(CategoryId::new(1), CategoryId::new(2));
        assert_eq!(
            err.to_string(),
            "category 2 is a descendant of category 1"
        );
    }

    #[rstest]
    fn duplicate_name_accepts_str() {
        let err = CategoryRepositoryError::duplicate_name("Movies");
        assert_eq!(err, CategoryRepositoryError::DuplicateName { name: "Movies".to_owned() });
    }
}
