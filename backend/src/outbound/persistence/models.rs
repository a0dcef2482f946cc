//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Row-to-domain conversions re-validate stored values and report
//! failures as strings, which the repositories map to query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use super::schema::{categories, comments, ratings};
use crate::domain::{
    Category, CategoryChanges, CategoryId, CategoryName, Comment, CommentBody, CommentId,
    ContentId, ContentRatingCount, NewCategory, NewComment, NewRating, ParentUpdate, Rating,
    RatingId, RatingValue, UserId,
};

// ---------------------------------------------------------------------------
// Category models
// ---------------------------------------------------------------------------

/// Row struct for reading from the categories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryRow {
    pub(crate) fn into_domain(self) -> Result<Category, String> {
        let name = CategoryName::new(self.name)
            .map_err(|err| format!("stored category {} has invalid name: {err}", self.id))?;
        Ok(Category {
            id: CategoryId::new(self.id),
            name,
            description: self.description,
            parent_id: self.parent_id.map(CategoryId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating category records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewCategory> for NewCategoryRow<'a> {
    fn from(value: &'a NewCategory) -> Self {
        Self {
            name: value.name.as_ref(),
            description: value.description.as_str(),
            parent_id: value.parent_id.map(CategoryId::get),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

/// Changeset for category updates; `None` fields are left untouched and
/// `parent_id: Some(None)` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = categories)]
pub(crate) struct CategoryChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub parent_id: Option<Option<i64>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a CategoryChanges> for CategoryChangeset<'a> {
    fn from(value: &'a CategoryChanges) -> Self {
        let parent_id = match value.parent {
            ParentUpdate::Keep => None,
            ParentUpdate::Detach => Some(None),
            ParentUpdate::Attach(parent_id) => Some(Some(parent_id.get())),
        };
        Self {
            name: value.name.as_ref().map(AsRef::as_ref),
            description: value.description.as_deref(),
            parent_id,
            updated_at: value.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Comment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub content_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) fn into_domain(self) -> Result<Comment, String> {
        let body = CommentBody::new(self.body)
            .map_err(|err| format!("stored comment {} has invalid body: {err}", self.id))?;
        Ok(Comment {
            id: CommentId::new(self.id),
            body,
            author_id: UserId::new(self.user_id),
            content_id: ContentId::new(self.content_id),
            parent_id: self.parent_id.map(CommentId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub body: &'a str,
    pub user_id: i64,
    pub content_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewComment> for NewCommentRow<'a> {
    fn from(value: &'a NewComment) -> Self {
        Self {
            body: value.body.as_ref(),
            user_id: value.author_id.get(),
            content_id: value.content_id.get(),
            parent_id: value.parent_id.map(CommentId::get),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Rating models
// ---------------------------------------------------------------------------

/// Row struct for reading from the ratings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: i64,
    pub value: i16,
    pub user_id: i64,
    pub content_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingRow {
    pub(crate) fn into_domain(self) -> Result<Rating, String> {
        let value = RatingValue::new(self.value)
            .map_err(|err| format!("stored rating {} is invalid: {err}", self.id))?;
        Ok(Rating {
            id: RatingId::new(self.id),
            user_id: UserId::new(self.user_id),
            content_id: ContentId::new(self.content_id),
            value,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating rating records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow {
    pub value: i16,
    pub user_id: i64,
    pub content_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&NewRating> for NewRatingRow {
    fn from(value: &NewRating) -> Self {
        Self {
            value: value.value.get(),
            user_id: value.user_id.get(),
            content_id: value.content_id.get(),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

/// Result row of the top-rated aggregate query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct TopRatedRow {
    #[diesel(sql_type = BigInt)]
    pub content_id: i64,
    #[diesel(sql_type = BigInt)]
    pub rating_count: i64,
}

impl TopRatedRow {
    pub(crate) fn into_domain(self) -> Result<ContentRatingCount, String> {
        let rating_count = u64::try_from(self.rating_count)
            .map_err(|_| format!("negative rating count for content {}", self.content_id))?;
        Ok(ContentRatingCount {
            content_id: ContentId::new(self.content_id),
            rating_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    fn category_row(name: &str) -> CategoryRow {
        CategoryRow {
            id: 3,
            name: name.to_owned(),
            description: String::new(),
            parent_id: Some(1),
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        }
    }

    #[rstest]
    fn category_row_converts_to_domain() {
        let category = category_row("Action").into_domain().expect("valid row");
        assert_eq!(category.id, CategoryId::new(3));
        assert_eq!(category.parent_id, Some(CategoryId::new(1)));
    }

    #[rstest]
    fn corrupt_category_row_is_reported() {
        let err = category_row("").into_domain().expect_err("blank name");
        assert!(err.contains("stored category 3"));
    }

    #[rstest]
    #[case(ParentUpdate::Keep, None)]
    #[case(ParentUpdate::Detach, Some(None))]
    #[case(ParentUpdate::Attach(CategoryId::new(9)), Some(Some(9)))]
    fn parent_update_maps_to_nullable_changeset(
        #[case] parent: ParentUpdate,
        #[case] expected: Option<Option<i64>>,
    ) {
        let changes = CategoryChanges {
            name: None,
            description: None,
            parent,
            updated_at: fixture_timestamp(),
        };
        assert_eq!(CategoryChangeset::from(&changes).parent_id, expected);
    }

    #[rstest]
    fn out_of_range_rating_value_is_reported() {
        let row = RatingRow {
            id: 1,
            value: 9,
            user_id: 7,
            content_id: 42,
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        };
        assert!(row.into_domain().is_err());
    }

    #[rstest]
    fn new_rating_row_writes_like_value() {
        let row = NewRatingRow::from(&NewRating::like(
            UserId::new(7),
            ContentId::new(42),
            fixture_timestamp(),
        ));
        assert_eq!(row.value, 1);
        assert_eq!(row.created_at, row.updated_at);
    }
}
