//! Existence guard shared by the managers.
//!
//! Each manager re-validates foreign references itself before mutating. The
//! helpers here keep the not-found wording and details uniform.

use serde_json::json;

use super::ports::{ContentRepository, ContentRepositoryError, UserRepository, UserRepositoryError};
use super::{CallContext, ContentId, Error, UserId};

pub(crate) fn map_content_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::internal(format!("content repository unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Fail with not-found unless the content item exists.
pub(crate) async fn require_content<C>(
    ctx: &CallContext,
    contents: &C,
    content_id: ContentId,
) -> Result<(), Error>
where
    C: ContentRepository + ?Sized,
{
    if ctx.run(contents.exists(content_id), map_content_error).await? {
        Ok(())
    } else {
        Err(Error::not_found("content not found")
            .with_details(json!({ "contentId": content_id, "code": "content_not_found" })))
    }
}

/// Fail with not-found unless the user exists.
pub(crate) async fn require_user<U>(
    ctx: &CallContext,
    users: &U,
    user_id: UserId,
) -> Result<(), Error>
where
    U: UserRepository + ?Sized,
{
    if ctx.run(users.exists(user_id), map_user_error).await? {
        Ok(())
    } else {
        Err(Error::not_found("user not found")
            .with_details(json!({ "userId": user_id, "code": "user_not_found" })))
    }
}
