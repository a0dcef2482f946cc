//! Unit tests for the rating toggle service.

use std::sync::Arc;

use mockall::Sequence;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    FixtureContentRepository, FixtureUserRepository, MockContentRepository, MockRatingRepository,
    MockUserRepository,
};
use crate::domain::{ErrorCode, RatingValue};
use crate::test_support::{fixture_clock, fixture_timestamp};

const USER: UserId = UserId::new(7);
const OTHER: UserId = UserId::new(8);
const CONTENT: ContentId = ContentId::new(42);

fn rating(raw_id: i64, user_id: UserId) -> Rating {
    Rating {
        id: RatingId::new(raw_id),
        user_id,
        content_id: CONTENT,
        value: RatingValue::LIKE,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

fn make_service<N, U>(
    ratings: MockRatingRepository,
    contents: N,
    users: U,
) -> RatingToggleService<MockRatingRepository, N, U>
where
    N: ContentRepository,
    U: UserRepository,
{
    RatingToggleService::new(
        Arc::new(ratings),
        Arc::new(contents),
        Arc::new(users),
        fixture_clock(),
        ServiceLimits::default(),
    )
}

#[fixture]
fn ctx() -> CallContext {
    CallContext::background()
}

#[rstest]
#[tokio::test]
async fn unrated_pair_becomes_liked(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .with(eq(USER), eq(CONTENT))
        .times(1)
        .return_once(|_, _| Ok(None));
    ratings
        .expect_create()
        .withf(|new| {
            new.value == RatingValue::LIKE
                && new.user_id == USER
                && new.created_at == fixture_timestamp()
        })
        .times(1)
        .return_once(|_| Ok(rating(1, USER)));

    let outcome = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect("toggle succeeds");

    assert!(outcome.is_liked());
}

#[rstest]
#[tokio::test]
async fn liked_pair_becomes_unrated(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .return_once(|_, _| Ok(Some(rating(3, USER))));
    ratings
        .expect_delete()
        .with(eq(RatingId::new(3)))
        .times(1)
        .return_once(|_| Ok(true));
    ratings.expect_create().never();

    let outcome = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect("toggle succeeds");

    assert_eq!(
        outcome,
        ToggleOutcome::Removed {
            rating_id: RatingId::new(3)
        }
    );
}

#[rstest]
#[tokio::test]
async fn missing_user_is_not_found(ctx: CallContext) {
    let mut users = MockUserRepository::new();
    users.expect_exists().return_once(|_| Ok(false));

    let err = make_service(MockRatingRepository::new(), FixtureContentRepository, users)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn missing_content_is_not_found(ctx: CallContext) {
    let mut contents = MockContentRepository::new();
    contents.expect_exists().return_once(|_| Ok(false));

    let err = make_service(MockRatingRepository::new(), contents, MockUserRepository::new())
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect_err("missing content");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn duplicate_insert_turns_into_removal(ctx: CallContext) {
    let mut seq = Sequence::new();
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(None));
    ratings
        .expect_create()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(RatingRepositoryError::duplicate(USER, CONTENT)));
    ratings
        .expect_find_by_user_and_content()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(Some(rating(9, USER))));
    ratings
        .expect_delete()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(true));

    let outcome = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect("toggle recovers");

    assert_eq!(
        outcome,
        ToggleOutcome::Removed {
            rating_id: RatingId::new(9)
        }
    );
}

#[rstest]
#[tokio::test]
async fn vanished_row_turns_into_creation(ctx: CallContext) {
    let mut seq = Sequence::new();
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(Some(rating(3, USER))));
    ratings
        .expect_delete()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(false));
    ratings
        .expect_find_by_user_and_content()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(None));
    ratings
        .expect_create()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(rating(4, USER)));

    let outcome = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect("toggle recovers");

    assert!(outcome.is_liked());
}

#[rstest]
#[tokio::test]
async fn exhausted_budget_is_conflict(ctx: CallContext) {
    let attempts = ServiceLimits::default().toggle_max_attempts;
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .times(attempts as usize)
        .returning(|_, _| Ok(None));
    ratings
        .expect_create()
        .times(attempts as usize)
        .returning(|_| Err(RatingRepositoryError::duplicate(USER, CONTENT)));

    let err = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect_err("contention");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn other_insert_failures_are_not_retried(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_user_and_content()
        .times(1)
        .return_once(|_, _| Ok(None));
    ratings
        .expect_create()
        .times(1)
        .return_once(|_| Err(RatingRepositoryError::query("disk full")));

    let err = make_service(ratings, FixtureContentRepository, FixtureUserRepository)
        .toggle_like(&ctx, USER, CONTENT)
        .await
        .expect_err("store failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[case(Actor::member(USER), true)]
#[case(Actor::admin(OTHER), true)]
#[case(Actor::member(OTHER), false)]
#[tokio::test]
async fn delete_rating_requires_owner_or_admin(
    ctx: CallContext,
    #[case] actor: Actor,
    #[case] allowed: bool,
) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_find_by_id()
        .return_once(|_| Ok(Some(rating(5, USER))));
    if allowed {
        ratings.expect_delete().times(1).return_once(|_| Ok(true));
    } else {
        ratings.expect_delete().never();
    }

    let result = make_service(ratings, MockContentRepository::new(), MockUserRepository::new())
        .delete_rating(&ctx, RatingId::new(5), actor)
        .await;

    match result {
        Ok(()) => assert!(allowed),
        Err(err) => {
            assert!(!allowed);
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_rating_is_not_found(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings.expect_find_by_id().return_once(|_| Ok(None));

    let err = make_service(ratings, MockContentRepository::new(), MockUserRepository::new())
        .delete_rating(&ctx, RatingId::new(5), Actor::admin(OTHER))
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn stats_count_likes(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_count_for_content()
        .with(eq(CONTENT))
        .return_once(|_| Ok(1));

    let stats = make_service(ratings, FixtureContentRepository, MockUserRepository::new())
        .stats_by_content(&ctx, CONTENT)
        .await
        .expect("stats");

    assert_eq!(stats.like_count, 1);
}

#[rstest]
#[case(0, 7)]
#[case(101, 7)]
#[case(10, 0)]
#[case(10, 366)]
#[tokio::test]
async fn top_rated_rejects_out_of_range_arguments(
    ctx: CallContext,
    #[case] limit: u32,
    #[case] window_days: u32,
) {
    let mut ratings = MockRatingRepository::new();
    ratings.expect_top_rated_since().never();

    let err = make_service(ratings, MockContentRepository::new(), MockUserRepository::new())
        .top_rated_content_ids(&ctx, limit, window_days)
        .await
        .expect_err("out of range");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn top_rated_window_starts_days_before_now(ctx: CallContext) {
    let mut ratings = MockRatingRepository::new();
    ratings
        .expect_top_rated_since()
        .withf(|since, limit| {
            *since == fixture_timestamp() - TimeDelta::days(7) && *limit == 5
        })
        .times(1)
        .return_once(|_, _| {
            Ok(vec![ContentRatingCount {
                content_id: CONTENT,
                rating_count: 3,
            }])
        });

    let top = make_service(ratings, MockContentRepository::new(), MockUserRepository::new())
        .top_rated_content_ids(&ctx, 5, 7)
        .await
        .expect("top rated");

    assert_eq!(top.len(), 1);
}
