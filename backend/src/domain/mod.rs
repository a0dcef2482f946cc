//! Domain entities, invariants and services.
//!
//! Purpose: enforce the publishing rules that hold regardless of transport:
//! the category forest never contains a cycle, replies stay attached to
//! comments on the same content, and a user holds at most one like per
//! content item. Services depend only on the traits in [`ports`].

pub mod actor;
pub mod category;
pub mod comment;
pub mod context;
pub mod error;
mod guard;
pub mod ids;
pub mod limits;
pub mod ports;
pub mod rating;

pub use self::actor::{Actor, CallerRole};
pub use self::category::{
    AncestorWalk, Category, CategoryChanges, CategoryHierarchyService, CategoryName,
    CategoryValidationError, MAX_CATEGORY_NAME_CHARS, NewCategory, ParentUpdate, WalkOutcome,
    WalkStep,
};
pub use self::comment::{
    Comment, CommentBody, CommentPayload, CommentThreadService, CommentValidationError,
    MAX_COMMENT_BODY_CHARS, NewComment,
};
pub use self::context::{CallContext, CancelHandle, CancelSignal};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{CategoryId, CommentId, ContentId, RatingId, UserId};
pub use self::limits::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_WINDOW_DAYS, DEFAULT_TOGGLE_MAX_ATTEMPTS, PageRequest,
    ServiceLimits,
};
pub use self::rating::{
    ContentRatingCount, InvalidRatingValue, NewRating, Rating, RatingStats, RatingToggleService,
    RatingValue, ToggleOutcome,
};
