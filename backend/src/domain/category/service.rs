//! Category hierarchy domain service.
//!
//! Implements [`CategoryHierarchy`] over a [`CategoryRepository`]. Name
//! uniqueness and cycle-freedom are checked here first so callers get precise
//! errors without a write; the repository re-enforces both atomically with
//! the write (unique index, transactional ancestor walk).

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{
    AncestorWalk, Category, CategoryChanges, CategoryName, NewCategory, ParentUpdate, WalkOutcome,
    WalkStep,
};
use crate::domain::ports::{
    CategoryHierarchy, CategoryRepository, CategoryRepositoryError, CreateCategoryRequest,
    UpdateCategoryRequest,
};
use crate::domain::{CallContext, CategoryId, Error, PageRequest, ServiceLimits};

/// Category hierarchy service implementing the driving port.
#[derive(Clone)]
pub struct CategoryHierarchyService<R> {
    categories: Arc<R>,
    clock: Arc<dyn Clock>,
    limits: ServiceLimits,
}

impl<R> CategoryHierarchyService<R> {
    /// Create a new service over the given repository.
    pub fn new(categories: Arc<R>, clock: Arc<dyn Clock>, limits: ServiceLimits) -> Self {
        Self {
            categories,
            clock,
            limits,
        }
    }
}

fn map_repository_error(error: CategoryRepositoryError) -> Error {
    match error {
        CategoryRepositoryError::Connection { message } => {
            Error::internal(format!("category repository unavailable: {message}"))
        }
        CategoryRepositoryError::Query { message } => {
            Error::internal(format!("category repository error: {message}"))
        }
        CategoryRepositoryError::DuplicateName { name } => duplicate_name_error(&name),
        CategoryRepositoryError::ParentNotFound { parent_id } => parent_not_found_error(parent_id),
        CategoryRepositoryError::NotFound { category_id } => category_not_found_error(category_id),
        CategoryRepositoryError::CircularReference {
            category_id,
            parent_id,
        } => circular_reference_error(category_id, parent_id),
        CategoryRepositoryError::Contention { message } => {
            Error::conflict("category hierarchy changed concurrently; retry the update")
                .with_details(json!({ "code": "contention", "reason": message }))
        }
    }
}

fn duplicate_name_error(name: &str) -> Error {
    Error::conflict("category name already exists").with_details(json!({
        "field": "name",
        "name": name,
        "code": "duplicate_name",
    }))
}

fn category_not_found_error(category_id: CategoryId) -> Error {
    Error::not_found("category not found").with_details(json!({
        "categoryId": category_id,
        "code": "category_not_found",
    }))
}

fn parent_not_found_error(parent_id: CategoryId) -> Error {
    Error::not_found("parent category not found").with_details(json!({
        "field": "parentId",
        "parentId": parent_id,
        "code": "parent_not_found",
    }))
}

fn self_parent_error(category_id: CategoryId) -> Error {
    Error::invalid_request("category cannot be its own parent").with_details(json!({
        "field": "parentId",
        "categoryId": category_id,
        "code": "self_parent",
    }))
}

fn circular_reference_error(category_id: CategoryId, parent_id: CategoryId) -> Error {
    Error::invalid_request("parent would create a circular reference").with_details(json!({
        "field": "parentId",
        "categoryId": category_id,
        "parentId": parent_id,
        "code": "circular_reference",
    }))
}

impl<R> CategoryHierarchyService<R>
where
    R: CategoryRepository,
{
    async fn load(&self, ctx: &CallContext, id: CategoryId) -> Result<Option<Category>, Error> {
        ctx.run(self.categories.find_by_id(id), map_repository_error)
            .await
    }

    async fn require_category(&self, ctx: &CallContext, id: CategoryId) -> Result<Category, Error> {
        self.load(ctx, id)
            .await?
            .ok_or_else(|| category_not_found_error(id))
    }

    async fn require_parent(&self, ctx: &CallContext, parent_id: CategoryId) -> Result<(), Error> {
        match self.load(ctx, parent_id).await? {
            Some(_) => Ok(()),
            None => {
                debug!(%parent_id, "parent category missing");
                Err(parent_not_found_error(parent_id))
            }
        }
    }

    /// Reject `name` if a category other than `own_id` already uses it.
    async fn ensure_name_available(
        &self,
        ctx: &CallContext,
        name: &CategoryName,
        own_id: Option<CategoryId>,
    ) -> Result<(), Error> {
        let existing = ctx
            .run(self.categories.find_by_name(name), map_repository_error)
            .await?;
        match existing {
            Some(other) if Some(other.id) != own_id => {
                debug!(name = %name, existing_id = %other.id, "category name taken");
                Err(duplicate_name_error(name.as_ref()))
            }
            _ => Ok(()),
        }
    }

    async fn walk_ancestors(
        &self,
        ctx: &CallContext,
        walk: &mut AncestorWalk,
        visited: &mut Vec<Category>,
    ) -> Result<WalkOutcome, Error> {
        loop {
            match walk.next_step() {
                WalkStep::Visit(node) => {
                    let found = self.load(ctx, node).await?;
                    let parent = found.as_ref().and_then(|category| category.parent_id);
                    visited.extend(found);
                    walk.record_parent(parent);
                }
                WalkStep::Done(outcome) => return Ok(outcome),
            }
        }
    }
}

fn log_corruption(category_id: CategoryId, outcome: WalkOutcome) {
    if let WalkOutcome::Corrupted { at } = outcome {
        warn!(
            %category_id,
            loops_at = %at,
            "category ancestor chain is corrupted; treating as circular"
        );
    }
}

#[async_trait]
impl<R> CategoryHierarchy for CategoryHierarchyService<R>
where
    R: CategoryRepository,
{
    async fn create_category(
        &self,
        ctx: &CallContext,
        request: CreateCategoryRequest,
    ) -> Result<Category, Error> {
        let name = CategoryName::new(request.name)?;
        self.ensure_name_available(ctx, &name, None).await?;
        if let Some(parent_id) = request.parent_id {
            self.require_parent(ctx, parent_id).await?;
        }

        let new_category = NewCategory {
            name,
            description: request.description,
            parent_id: request.parent_id,
            created_at: self.clock.utc(),
        };
        let created = ctx
            .run(self.categories.create(&new_category), map_repository_error)
            .await?;
        info!(category_id = %created.id, name = %created.name, "category created");
        Ok(created)
    }

    async fn update_category(
        &self,
        ctx: &CallContext,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error> {
        let UpdateCategoryRequest {
            id,
            name,
            description,
            parent,
        } = request;

        let current = self.require_category(ctx, id).await?;
        let name = name.map(CategoryName::new).transpose()?;
        if let Some(name) = name.as_ref().filter(|name| **name != current.name) {
            self.ensure_name_available(ctx, name, Some(id)).await?;
        }

        if let ParentUpdate::Attach(parent_id) = parent {
            if parent_id == id {
                debug!(category_id = %id, "rejected self-parenting update");
                return Err(self_parent_error(id));
            }
            self.require_parent(ctx, parent_id).await?;
            if self.check_circular_reference(ctx, id, Some(parent_id)).await? {
                debug!(category_id = %id, %parent_id, "rejected circular parent");
                return Err(circular_reference_error(id, parent_id));
            }
        }

        let changes = CategoryChanges {
            name,
            description,
            parent,
            updated_at: self.clock.utc(),
        };
        let updated = ctx
            .run(
                self.categories.update(id, &changes),
                map_repository_error,
            )
            .await?;
        info!(category_id = %updated.id, parent_id = ?updated.parent_id, "category updated");
        Ok(updated)
    }

    async fn delete_category(&self, ctx: &CallContext, id: CategoryId) -> Result<(), Error> {
        self.require_category(ctx, id).await?;
        let deleted = ctx
            .run(self.categories.delete(id), map_repository_error)
            .await?;
        if !deleted {
            return Err(category_not_found_error(id));
        }
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    async fn get_category(&self, ctx: &CallContext, id: CategoryId) -> Result<Category, Error> {
        self.require_category(ctx, id).await
    }

    async fn list_children(
        &self,
        ctx: &CallContext,
        parent_id: Option<CategoryId>,
        page: PageRequest,
    ) -> Result<Vec<Category>, Error> {
        page.validate(&self.limits)?;
        if let Some(parent_id) = parent_id {
            self.require_parent(ctx, parent_id).await?;
        }
        ctx.run(
            self.categories.list_children(parent_id, page),
            map_repository_error,
        )
        .await
    }

    async fn ancestors(&self, ctx: &CallContext, id: CategoryId) -> Result<Vec<Category>, Error> {
        let category = self.require_category(ctx, id).await?;
        let mut walk = AncestorWalk::new(id, category.parent_id);
        let mut chain = Vec::new();
        let outcome = self.walk_ancestors(ctx, &mut walk, &mut chain).await?;
        if outcome.is_circular() {
            warn!(category_id = %id, ?outcome, "category ancestor chain loops");
            return Err(Error::internal("category ancestry is corrupted")
                .with_details(json!({ "categoryId": id, "code": "corrupted_ancestry" })));
        }
        Ok(chain)
    }

    async fn check_circular_reference(
        &self,
        ctx: &CallContext,
        category_id: CategoryId,
        candidate_parent_id: Option<CategoryId>,
    ) -> Result<bool, Error> {
        let mut walk = AncestorWalk::new(category_id, candidate_parent_id);
        let outcome = self
            .walk_ancestors(ctx, &mut walk, &mut Vec::new())
            .await?;
        log_corruption(category_id, outcome);
        Ok(outcome.is_circular())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
