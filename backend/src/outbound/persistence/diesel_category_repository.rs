//! PostgreSQL-backed category repository.
//!
//! Re-parenting runs in a serializable transaction: the category row is
//! locked, the new parent's ancestor chain is walked with the same
//! [`AncestorWalk`] the domain uses, and only then is the row updated. A
//! concurrent re-parent elsewhere in the chain makes one of the two
//! transactions fail with a serialization error, reported as
//! [`CategoryRepositoryError::Contention`].

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::diesel_helpers::{
    DieselFailure, classify, collect_rows, page_bounds, pool_error_message,
};
use super::models::{CategoryChangeset, CategoryRow, NewCategoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::categories;
use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};
use crate::domain::{
    AncestorWalk, Category, CategoryChanges, CategoryId, CategoryName, NewCategory, PageRequest,
    ParentUpdate, WalkStep,
};

const NAME_CONSTRAINT: &str = "categories_name_key";
const NOT_OWN_PARENT_CONSTRAINT: &str = "categories_not_own_parent";

/// Diesel-backed implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Error type threaded through the update transaction.
enum UpdateTxError {
    Diesel(diesel::result::Error),
    Rejected(CategoryRepositoryError),
}

impl From<diesel::result::Error> for UpdateTxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn map_pool_error(error: PoolError) -> CategoryRepositoryError {
    CategoryRepositoryError::connection(pool_error_message(error))
}

/// Map a failed write; `name` and `parent_id` identify what was written.
fn map_write_error(
    error: diesel::result::Error,
    operation: &str,
    id: Option<CategoryId>,
    name: Option<&CategoryName>,
    parent_id: Option<CategoryId>,
) -> CategoryRepositoryError {
    let failure = classify(error, operation);
    match (&failure, name, parent_id, id) {
        (DieselFailure::UniqueViolation { .. }, Some(name), _, _)
            if failure.constraint_is(NAME_CONSTRAINT) =>
        {
            CategoryRepositoryError::duplicate_name(name.as_ref())
        }
        (DieselFailure::ForeignKeyViolation { .. }, _, Some(parent_id), _) => {
            CategoryRepositoryError::parent_not_found(parent_id)
        }
        (DieselFailure::CheckViolation { .. }, _, _, Some(id))
            if failure.constraint_is(NOT_OWN_PARENT_CONSTRAINT) =>
        {
            CategoryRepositoryError::circular_reference(id, id)
        }
        _ => map_failure(failure),
    }
}

fn map_failure(failure: DieselFailure) -> CategoryRepositoryError {
    match failure {
        DieselFailure::SerializationFailure => {
            CategoryRepositoryError::contention("concurrent category update")
        }
        DieselFailure::Connection => {
            CategoryRepositoryError::connection("database connection error")
        }
        DieselFailure::UniqueViolation { .. }
        | DieselFailure::ForeignKeyViolation { .. }
        | DieselFailure::CheckViolation { .. } => {
            CategoryRepositoryError::query("constraint violation")
        }
        DieselFailure::Other { .. } => CategoryRepositoryError::query("database error"),
    }
}

fn map_read_error(error: diesel::result::Error) -> CategoryRepositoryError {
    map_failure(classify(error, "category read"))
}

fn into_domain(row: CategoryRow) -> Result<Category, CategoryRepositoryError> {
    row.into_domain().map_err(CategoryRepositoryError::query)
}

/// Parent column of `id`; the outer `None` means the row is gone.
async fn parent_row(
    conn: &mut AsyncPgConnection,
    id: CategoryId,
) -> Result<Option<Option<CategoryId>>, diesel::result::Error> {
    let parent: Option<Option<i64>> = categories::table
        .find(id.get())
        .select(categories::parent_id)
        .first(conn)
        .await
        .optional()?;
    Ok(parent.map(|parent| parent.map(CategoryId::new)))
}

async fn apply_update(
    conn: &mut AsyncPgConnection,
    id: CategoryId,
    changes: &CategoryChanges,
) -> Result<CategoryRow, UpdateTxError> {
    let locked: Option<i64> = categories::table
        .find(id.get())
        .select(categories::id)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    if locked.is_none() {
        return Err(UpdateTxError::Rejected(CategoryRepositoryError::not_found(
            id,
        )));
    }

    if let ParentUpdate::Attach(parent_id) = changes.parent {
        let mut walk = AncestorWalk::new(id, Some(parent_id));
        let outcome = loop {
            match walk.next_step() {
                WalkStep::Visit(node) => match parent_row(conn, node).await? {
                    Some(parent) => walk.record_parent(parent),
                    None if node == parent_id => {
                        return Err(UpdateTxError::Rejected(
                            CategoryRepositoryError::parent_not_found(parent_id),
                        ));
                    }
                    None => walk.record_parent(None),
                },
                WalkStep::Done(outcome) => break outcome,
            }
        };
        if outcome.is_circular() {
            return Err(UpdateTxError::Rejected(
                CategoryRepositoryError::circular_reference(id, parent_id),
            ));
        }
    }

    let changeset = CategoryChangeset::from(changes);
    let row = diesel::update(categories::table.find(id.get()))
        .set(&changeset)
        .returning(CategoryRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(row)
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = categories::table
            .find(id.get())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(into_domain).transpose()
    }

    async fn find_by_name(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = categories::table
            .filter(categories::name.eq(name.as_ref()))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        row.map(into_domain).transpose()
    }

    async fn list_children(
        &self,
        parent_id: Option<CategoryId>,
        page: PageRequest,
    ) -> Result<Vec<Category>, CategoryRepositoryError> {
        let (limit, offset) = page_bounds(page).map_err(CategoryRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let query = categories::table
            .select(CategoryRow::as_select())
            .into_boxed();
        let query = match parent_id {
            Some(parent_id) => query.filter(categories::parent_id.eq(parent_id.get())),
            None => query.filter(categories::parent_id.is_null()),
        };
        let rows = query
            .order_by((categories::name.asc(), categories::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;
        collect_rows(rows, CategoryRow::into_domain).map_err(CategoryRepositoryError::query)
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(categories::table)
            .values(NewCategoryRow::from(category))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_write_error(
                    err,
                    "category insert",
                    None,
                    Some(&category.name),
                    category.parent_id,
                )
            })?;
        into_domain(row)
    }

    async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move { apply_update(conn, id, changes).await }.scope_boxed()
            })
            .await;
        let attached = match changes.parent {
            ParentUpdate::Attach(parent_id) => Some(parent_id),
            ParentUpdate::Keep | ParentUpdate::Detach => None,
        };
        match result {
            Ok(row) => into_domain(row),
            Err(UpdateTxError::Rejected(err)) => Err(err),
            Err(UpdateTxError::Diesel(err)) => Err(map_write_error(
                err,
                "category update",
                Some(id),
                changes.name.as_ref(),
                attached,
            )),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(categories::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify(err, "category delete")))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn name(raw: &str) -> CategoryName {
        CategoryName::new(raw).expect("valid name")
    }

    #[rstest]
    fn serialization_failure_is_contention() {
        let err = map_failure(DieselFailure::SerializationFailure);
        assert!(matches!(err, CategoryRepositoryError::Contention { .. }));
    }

    #[rstest]
    fn closed_connection_is_connection_error() {
        let err = map_failure(DieselFailure::Connection);
        assert!(matches!(err, CategoryRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn non_constraint_failure_is_a_query_error() {
        let err = map_write_error(
            diesel::result::Error::NotFound,
            "category insert",
            None,
            Some(&name("Movies")),
            None,
        );
        assert!(matches!(err, CategoryRepositoryError::Query { .. }));
    }
}
