//! Constraint coverage for the in-memory store.

use chrono::TimeDelta;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    CategoryRepository, CategoryRepositoryError, CommentRepository, CommentRepositoryError,
    RatingRepository, RatingRepositoryError,
};
use crate::domain::{
    CategoryChanges, CategoryName, CommentBody, NewCategory, NewComment, NewRating, ParentUpdate,
};
use crate::test_support::fixture_timestamp;

const USER: UserId = UserId::new(7);
const CONTENT: ContentId = ContentId::new(42);

#[fixture]
fn store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.add_user(USER);
    store.add_content(CONTENT);
    store
}

fn new_category(name: &str, parent: Option<CategoryId>) -> NewCategory {
    NewCategory {
        name: CategoryName::new(name).expect("valid name"),
        description: String::new(),
        parent_id: parent,
        created_at: fixture_timestamp(),
    }
}

fn reparent(parent: ParentUpdate) -> CategoryChanges {
    CategoryChanges {
        name: None,
        description: None,
        parent,
        updated_at: fixture_timestamp(),
    }
}

fn new_comment(parent: Option<CommentId>) -> NewComment {
    NewComment {
        body: CommentBody::new("hello").expect("valid body"),
        author_id: USER,
        content_id: CONTENT,
        parent_id: parent,
        created_at: fixture_timestamp(),
    }
}

#[rstest]
#[tokio::test]
async fn duplicate_category_names_are_rejected(store: InMemoryStore) {
    CategoryRepository::create(&store, &new_category("Movies", None))
        .await
        .expect("first insert");

    let err = CategoryRepository::create(&store, &new_category("Movies", None))
        .await
        .expect_err("duplicate");

    assert_eq!(err, CategoryRepositoryError::duplicate_name("Movies"));
}

#[rstest]
#[tokio::test]
async fn reparent_rechecks_cycles_under_the_lock(store: InMemoryStore) {
    let movies = CategoryRepository::create(&store, &new_category("Movies", None))
        .await
        .expect("movies");
    let action = CategoryRepository::create(&store, &new_category("Action", Some(movies.id)))
        .await
        .expect("action");

    let err = CategoryRepository::update(
        &store,
        movies.id,
        &reparent(ParentUpdate::Attach(action.id)),
    )
    .await
    .expect_err("cycle");

    assert_eq!(
        err,
        CategoryRepositoryError::circular_reference(movies.id, action.id)
    );
}

#[rstest]
#[tokio::test]
async fn deleting_a_category_detaches_children(store: InMemoryStore) {
    let movies = CategoryRepository::create(&store, &new_category("Movies", None))
        .await
        .expect("movies");
    let action = CategoryRepository::create(&store, &new_category("Action", Some(movies.id)))
        .await
        .expect("action");

    assert!(CategoryRepository::delete(&store, movies.id).await.expect("delete"));
    let orphan = CategoryRepository::find_by_id(&store, action.id)
        .await
        .expect("lookup")
        .expect("child survives");

    assert!(orphan.is_root());
}

#[rstest]
#[tokio::test]
async fn children_are_listed_by_name(store: InMemoryStore) {
    for name in ["Drama", "Action", "Comedy"] {
        CategoryRepository::create(&store, &new_category(name, None))
            .await
            .expect("insert");
    }

    let page = CategoryRepository::list_children(&store, None, PageRequest::new(2, 1))
        .await
        .expect("list");
    let names: Vec<&str> = page.iter().map(|c| c.name.as_ref()).collect();

    assert_eq!(names, vec!["Comedy", "Drama"]);
}

#[rstest]
#[tokio::test]
async fn deleting_a_comment_cascades_to_nested_replies(store: InMemoryStore) {
    let root = CommentRepository::create(&store, &new_comment(None))
        .await
        .expect("root");
    let reply = CommentRepository::create(&store, &new_comment(Some(root.id)))
        .await
        .expect("reply");
    let nested = CommentRepository::create(&store, &new_comment(Some(reply.id)))
        .await
        .expect("nested");
    let sibling = CommentRepository::create(&store, &new_comment(None))
        .await
        .expect("sibling");

    assert!(CommentRepository::delete(&store, root.id).await.expect("delete"));

    for gone in [root.id, reply.id, nested.id] {
        let found = CommentRepository::find_by_id(&store, gone).await.expect("lookup");
        assert!(found.is_none());
    }
    let kept = CommentRepository::find_by_id(&store, sibling.id)
        .await
        .expect("lookup");
    assert!(kept.is_some());
}

#[rstest]
#[tokio::test]
async fn comments_need_existing_referents(store: InMemoryStore) {
    let mut orphan = new_comment(None);
    orphan.content_id = ContentId::new(999);

    let err = CommentRepository::create(&store, &orphan)
        .await
        .expect_err("missing content");

    assert!(matches!(err, CommentRepositoryError::MissingReferent { .. }));
}

#[rstest]
#[tokio::test]
async fn second_rating_for_pair_is_duplicate(store: InMemoryStore) {
    let like = NewRating::like(USER, CONTENT, fixture_timestamp());
    RatingRepository::create(&store, &like).await.expect("first like");

    let err = RatingRepository::create(&store, &like)
        .await
        .expect_err("duplicate");

    assert_eq!(err, RatingRepositoryError::duplicate(USER, CONTENT));
    assert_eq!(store.rating_rows(USER, CONTENT), 1);
}

#[rstest]
#[tokio::test]
async fn top_rated_counts_only_the_window(store: InMemoryStore) {
    let other_user = UserId::new(8);
    let other_content = ContentId::new(43);
    store.add_user(other_user);
    store.add_content(other_content);
    let now = fixture_timestamp();
    let old = now - TimeDelta::days(30);

    for (user, content, at) in [
        (USER, CONTENT, now),
        (other_user, CONTENT, old),
        (USER, other_content, now),
        (other_user, other_content, now),
    ] {
        RatingRepository::create(&store, &NewRating::like(user, content, at))
            .await
            .expect("like");
    }

    let top = RatingRepository::top_rated_since(&store, now - TimeDelta::days(7), 10)
        .await
        .expect("top rated");

    assert_eq!(
        top,
        vec![
            crate::domain::ContentRatingCount {
                content_id: other_content,
                rating_count: 2,
            },
            crate::domain::ContentRatingCount {
                content_id: CONTENT,
                rating_count: 1,
            },
        ]
    );
}
