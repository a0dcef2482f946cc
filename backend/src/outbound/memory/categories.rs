//! [`CategoryRepository`] over the in-memory store.

use async_trait::async_trait;

use super::{InMemoryStore, StoreState, page_slice, round_trip};
use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{
    AncestorWalk, Category, CategoryChanges, CategoryId, CategoryName, NewCategory, PageRequest,
    ParentUpdate,
};

impl StoreState {
    fn name_taken(&self, name: &CategoryName, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|category| category.name == *name && Some(category.id) != except)
    }

    fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.categories
            .get(&id)
            .and_then(|category| category.parent_id)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        round_trip().await;
        Ok(self.lock().categories.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        round_trip().await;
        Ok(self
            .lock()
            .categories
            .values()
            .find(|category| category.name == *name)
            .cloned())
    }

    async fn list_children(
        &self,
        parent_id: Option<CategoryId>,
        page: PageRequest,
    ) -> Result<Vec<Category>, CategoryRepositoryError> {
        round_trip().await;
        let state = self.lock();
        let mut children: Vec<&Category> = state
            .categories
            .values()
            .filter(|category| category.parent_id == parent_id)
            .collect();
        children.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()).then(a.id.cmp(&b.id)));
        Ok(page_slice(children.into_iter().cloned(), page))
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if state.name_taken(&category.name, None) {
            return Err(CategoryRepositoryError::duplicate_name(
                category.name.as_ref(),
            ));
        }
        if let Some(parent_id) = category.parent_id {
            if !state.categories.contains_key(&parent_id) {
                return Err(CategoryRepositoryError::parent_not_found(parent_id));
            }
        }
        state.last_category_id += 1;
        let created = Category {
            id: CategoryId::new(state.last_category_id),
            name: category.name.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            created_at: category.created_at,
            updated_at: category.created_at,
        };
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, CategoryRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if !state.categories.contains_key(&id) {
            return Err(CategoryRepositoryError::not_found(id));
        }
        if let Some(name) = &changes.name {
            if state.name_taken(name, Some(id)) {
                return Err(CategoryRepositoryError::duplicate_name(name.as_ref()));
            }
        }
        let parent_id = match changes.parent {
            ParentUpdate::Keep => state.parent_of(id),
            ParentUpdate::Detach => None,
            ParentUpdate::Attach(parent_id) => {
                if !state.categories.contains_key(&parent_id) {
                    return Err(CategoryRepositoryError::parent_not_found(parent_id));
                }
                let outcome = AncestorWalk::new(id, Some(parent_id))
                    .run_with(|node| state.parent_of(node));
                if outcome.is_circular() {
                    return Err(CategoryRepositoryError::circular_reference(id, parent_id));
                }
                Some(parent_id)
            }
        };

        let Some(category) = state.categories.get_mut(&id) else {
            return Err(CategoryRepositoryError::not_found(id));
        };
        if let Some(name) = &changes.name {
            category.name = name.clone();
        }
        if let Some(description) = &changes.description {
            category.description = description.clone();
        }
        category.parent_id = parent_id;
        category.updated_at = changes.updated_at;
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError> {
        round_trip().await;
        let mut state = self.lock();
        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for child in state.categories.values_mut() {
            if child.parent_id == Some(id) {
                child.parent_id = None;
            }
        }
        Ok(true)
    }
}
