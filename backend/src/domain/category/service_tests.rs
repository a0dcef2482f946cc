//! Unit tests for the category hierarchy service.

use std::collections::HashMap;
use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockCategoryRepository;
use crate::domain::ErrorCode;
use crate::test_support::{fixture_clock, fixture_timestamp};

fn id(raw: i64) -> CategoryId {
    CategoryId::new(raw)
}

fn category(raw_id: i64, name: &str, parent: Option<i64>) -> Category {
    Category {
        id: id(raw_id),
        name: CategoryName::new(name).expect("valid fixture name"),
        description: String::new(),
        parent_id: parent.map(id),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// Answer `find_by_id` from a fixed set of categories.
fn with_tree(repo: &mut MockCategoryRepository, nodes: Vec<Category>) {
    let tree: HashMap<CategoryId, Category> =
        nodes.into_iter().map(|node| (node.id, node)).collect();
    repo.expect_find_by_id()
        .returning(move |lookup| Ok(tree.get(&lookup).cloned()));
}

fn make_service(repo: MockCategoryRepository) -> CategoryHierarchyService<MockCategoryRepository> {
    CategoryHierarchyService::new(Arc::new(repo), fixture_clock(), ServiceLimits::default())
}

#[fixture]
fn ctx() -> CallContext {
    CallContext::background()
}

fn detail_code(err: &Error) -> Option<String> {
    err.details()
        .and_then(|details| details["code"].as_str())
        .map(str::to_owned)
}

#[rstest]
#[tokio::test]
async fn create_persists_category_with_server_timestamp(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name().times(1).return_once(|_| Ok(None));
    with_tree(&mut repo, vec![category(1, "Movies", None)]);
    repo.expect_create()
        .withf(|new| {
            new.name.as_ref() == "Action"
                && new.parent_id == Some(CategoryId::new(1))
                && new.created_at == fixture_timestamp()
        })
        .times(1)
        .return_once(|_| Ok(category(2, "Action", Some(1))));

    let created = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root("Action").under(id(1)))
        .await
        .expect("create succeeds");

    assert_eq!(created.id, id(2));
    assert_eq!(created.parent_id, Some(id(1)));
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_name_without_writing(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name()
        .times(1)
        .return_once(|_| Ok(Some(category(1, "Movies", None))));
    repo.expect_create().never();

    let err = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root("Movies"))
        .await
        .expect_err("duplicate name");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(detail_code(&err).as_deref(), Some("duplicate_name"));
}

#[rstest]
#[tokio::test]
async fn create_rejects_missing_parent(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name().return_once(|_| Ok(None));
    with_tree(&mut repo, vec![]);
    repo.expect_create().never();

    let err = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root("Action").under(id(99)))
        .await
        .expect_err("missing parent");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(detail_code(&err).as_deref(), Some("parent_not_found"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn create_rejects_invalid_name_before_touching_the_store(
    ctx: CallContext,
    #[case] name: &str,
) {
    let repo = MockCategoryRepository::new();

    let err = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root(name))
        .await
        .expect_err("invalid name");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_surfaces_unique_index_race_as_conflict(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name().return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(CategoryRepositoryError::duplicate_name("Movies")));

    let err = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root("Movies"))
        .await
        .expect_err("raced duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn reparenting_under_own_child_is_rejected(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(
        &mut repo,
        vec![category(1, "Movies", None), category(2, "Action", Some(1))],
    );
    repo.expect_update().never();

    let err = make_service(repo)
        .update_category(
            &ctx,
            UpdateCategoryRequest::new(id(1)).reparent(ParentUpdate::Attach(id(2))),
        )
        .await
        .expect_err("cycle");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(detail_code(&err).as_deref(), Some("circular_reference"));
}

#[rstest]
#[tokio::test]
async fn self_parent_is_rejected(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![category(5, "Drama", None)]);
    repo.expect_update().never();

    let err = make_service(repo)
        .update_category(
            &ctx,
            UpdateCategoryRequest::new(id(5)).reparent(ParentUpdate::Attach(id(5))),
        )
        .await
        .expect_err("self parent");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(detail_code(&err).as_deref(), Some("self_parent"));
}

#[rstest]
#[tokio::test]
async fn update_of_missing_category_is_not_found(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![]);

    let err = make_service(repo)
        .update_category(&ctx, UpdateCategoryRequest::new(id(3)).rename("Other"))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn rename_to_taken_name_is_conflict(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![category(2, "Action", None)]);
    repo.expect_find_by_name()
        .times(1)
        .return_once(|_| Ok(Some(category(1, "Movies", None))));
    repo.expect_update().never();

    let err = make_service(repo)
        .update_category(&ctx, UpdateCategoryRequest::new(id(2)).rename("Movies"))
        .await
        .expect_err("taken name");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn keeping_own_name_skips_uniqueness_lookup(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![category(2, "Action", None)]);
    repo.expect_find_by_name().never();
    repo.expect_update()
        .withf(|target, changes| {
            *target == CategoryId::new(2)
                && changes.description.as_deref() == Some("Explosions")
                && changes.parent == ParentUpdate::Keep
        })
        .times(1)
        .return_once(|_, _| {
            let mut updated = category(2, "Action", None);
            updated.description = "Explosions".to_owned();
            Ok(updated)
        });

    let updated = make_service(repo)
        .update_category(
            &ctx,
            UpdateCategoryRequest::new(id(2))
                .rename("Action")
                .describe("Explosions"),
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.description, "Explosions");
}

#[rstest]
#[case(
    CategoryRepositoryError::circular_reference(CategoryId::new(1), CategoryId::new(3)),
    ErrorCode::InvalidRequest
)]
#[case(CategoryRepositoryError::contention("serialization failure"), ErrorCode::Conflict)]
#[case(CategoryRepositoryError::duplicate_name("Drama"), ErrorCode::Conflict)]
#[case(CategoryRepositoryError::connection("refused"), ErrorCode::InternalError)]
#[tokio::test]
async fn write_time_failures_are_classified(
    ctx: CallContext,
    #[case] failure: CategoryRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockCategoryRepository::new();
    with_tree(
        &mut repo,
        vec![category(1, "Movies", None), category(3, "Drama", None)],
    );
    repo.expect_update()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let err = make_service(repo)
        .update_category(
            &ctx,
            UpdateCategoryRequest::new(id(1)).reparent(ParentUpdate::Attach(id(3))),
        )
        .await
        .expect_err("write failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn detaching_skips_the_ancestor_walk(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_id()
        .with(eq(id(2)))
        .times(1)
        .return_once(|_| Ok(Some(category(2, "Action", Some(1)))));
    repo.expect_update()
        .withf(|_, changes| changes.parent == ParentUpdate::Detach)
        .times(1)
        .return_once(|_, _| Ok(category(2, "Action", None)));

    let updated = make_service(repo)
        .update_category(
            &ctx,
            UpdateCategoryRequest::new(id(2)).reparent(ParentUpdate::Detach),
        )
        .await
        .expect("detach succeeds");

    assert!(updated.is_root());
}

#[rstest]
#[tokio::test]
async fn null_candidate_is_never_circular(ctx: CallContext) {
    let repo = MockCategoryRepository::new();

    let circular = make_service(repo)
        .check_circular_reference(&ctx, id(1), None)
        .await
        .expect("check succeeds");

    assert!(!circular);
}

#[rstest]
#[case(1, 3, true)]
#[case(2, 3, true)]
#[case(3, 3, true)]
#[case(4, 3, false)]
#[case(3, 1, false)]
#[tokio::test]
async fn cycle_detector_matches_ancestor_membership(
    ctx: CallContext,
    #[case] target: i64,
    #[case] candidate: i64,
    #[case] expected: bool,
) {
    // 3 -> 2 -> 1 -> root, 4 is a separate root
    let mut repo = MockCategoryRepository::new();
    with_tree(
        &mut repo,
        vec![
            category(1, "A", None),
            category(2, "B", Some(1)),
            category(3, "C", Some(2)),
            category(4, "D", None),
        ],
    );

    let circular = make_service(repo)
        .check_circular_reference(&ctx, id(target), Some(id(candidate)))
        .await
        .expect("check succeeds");

    assert_eq!(circular, expected);
}

#[rstest]
#[tokio::test]
async fn corrupted_chain_terminates_and_counts_as_circular(ctx: CallContext) {
    // 2 <-> 3 loop left behind by an earlier bug
    let mut repo = MockCategoryRepository::new();
    with_tree(
        &mut repo,
        vec![category(2, "B", Some(3)), category(3, "C", Some(2))],
    );

    let circular = make_service(repo)
        .check_circular_reference(&ctx, id(9), Some(id(2)))
        .await
        .expect("check terminates");

    assert!(circular);
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_category_is_not_found(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![]);
    repo.expect_delete().never();

    let err = make_service(repo)
        .delete_category(&ctx, id(7))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_that_loses_a_race_is_not_found(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(&mut repo, vec![category(7, "Gone", None)]);
    repo.expect_delete().times(1).return_once(|_| Ok(false));

    let err = make_service(repo)
        .delete_category(&ctx, id(7))
        .await
        .expect_err("raced delete");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn ancestors_are_listed_nearest_first(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    with_tree(
        &mut repo,
        vec![
            category(1, "A", None),
            category(2, "B", Some(1)),
            category(3, "C", Some(2)),
        ],
    );

    let chain = make_service(repo)
        .ancestors(&ctx, id(3))
        .await
        .expect("ancestors");

    let ids: Vec<CategoryId> = chain.iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![id(2), id(1)]);
}

#[rstest]
#[tokio::test]
async fn list_children_validates_page_limit(ctx: CallContext) {
    let repo = MockCategoryRepository::new();

    let err = make_service(repo)
        .list_children(&ctx, None, PageRequest::first(0))
        .await
        .expect_err("bad limit");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn store_failures_are_internal_and_redacted(ctx: CallContext) {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_id()
        .return_once(|_| Err(CategoryRepositoryError::connection("db-3 refused")));

    let err = make_service(repo)
        .get_category(&ctx, id(1))
        .await
        .expect_err("store failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.public_message(), "internal server error");
}

#[rstest]
#[tokio::test]
async fn expired_context_never_reaches_the_write() {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name().never();
    repo.expect_create().never();
    let ctx = CallContext::background().with_deadline(tokio::time::Instant::now());

    let err = make_service(repo)
        .create_category(&ctx, CreateCategoryRequest::root("Movies"))
        .await
        .expect_err("expired");

    assert_eq!(err.code(), ErrorCode::InternalError);
}
