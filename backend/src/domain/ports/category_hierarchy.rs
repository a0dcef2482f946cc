//! Driving port for category tree operations.
//!
//! The [`CategoryHierarchy`] trait is what a transport adapter calls once it
//! has authenticated the caller and parsed primitive parameters.

use async_trait::async_trait;

use crate::domain::{CallContext, Category, CategoryId, Error, PageRequest, ParentUpdate};

/// Request to create a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryRequest {
    /// Unique name, at most 100 characters.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Optional parent category.
    pub parent_id: Option<CategoryId>,
}

impl CreateCategoryRequest {
    /// Root category request with an empty description.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parent_id: None,
        }
    }

    /// Place the new category under `parent_id`.
    pub fn under(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Request to update a category. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCategoryRequest {
    /// Category to update.
    pub id: CategoryId,
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Parent change.
    pub parent: ParentUpdate,
}

impl UpdateCategoryRequest {
    /// Request that changes nothing yet.
    pub fn new(id: CategoryId) -> Self {
        Self {
            id,
            name: None,
            description: None,
            parent: ParentUpdate::Keep,
        }
    }

    /// Rename the category.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Change the parent.
    pub fn reparent(mut self, parent: ParentUpdate) -> Self {
        self.parent = parent;
        self
    }
}

/// Driving port for the category forest.
///
/// Every failure is reported as one [`Error`]; a rejected update writes
/// nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryHierarchy: Send + Sync {
    /// Create a category.
    ///
    /// # Errors
    ///
    /// Invalid name, missing parent (not found), or duplicate name (conflict).
    async fn create_category(
        &self,
        ctx: &CallContext,
        request: CreateCategoryRequest,
    ) -> Result<Category, Error>;

    /// Update name, description and parent in one write.
    ///
    /// # Errors
    ///
    /// Invalid name, self-parenting or a cycle (invalid request), missing
    /// category or parent (not found), duplicate name (conflict).
    async fn update_category(
        &self,
        ctx: &CallContext,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error>;

    /// Delete a category; its direct children become roots.
    ///
    /// # Errors
    ///
    /// Missing category (not found).
    async fn delete_category(&self, ctx: &CallContext, id: CategoryId) -> Result<(), Error>;

    /// Fetch one category.
    ///
    /// # Errors
    ///
    /// Missing category (not found).
    async fn get_category(&self, ctx: &CallContext, id: CategoryId) -> Result<Category, Error>;

    /// Direct children of `parent_id`, or roots when `None`, ordered by name.
    ///
    /// # Errors
    ///
    /// Page limit out of range (invalid request), missing parent (not found).
    async fn list_children(
        &self,
        ctx: &CallContext,
        parent_id: Option<CategoryId>,
        page: PageRequest,
    ) -> Result<Vec<Category>, Error>;

    /// Ancestors of a category from its direct parent up to the root.
    ///
    /// # Errors
    ///
    /// Missing category (not found); a looping chain is an internal error.
    async fn ancestors(&self, ctx: &CallContext, id: CategoryId) -> Result<Vec<Category>, Error>;

    /// Whether `category_id` appears in the ancestor chain starting at
    /// `candidate_parent_id` (the candidate itself included).
    ///
    /// A corrupted chain is reported as circular.
    ///
    /// # Errors
    ///
    /// Store failures only.
    async fn check_circular_reference(
        &self,
        ctx: &CallContext,
        category_id: CategoryId,
        candidate_parent_id: Option<CategoryId>,
    ) -> Result<bool, Error>;
}
