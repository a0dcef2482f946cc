//! Store-assigned identifiers.
//!
//! Every entity is keyed by a 64-bit integer allocated by the store. Each
//! entity gets its own newtype so a comment id can never be passed where a
//! category id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw identifier as stored.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Identifier of a category node.
    CategoryId
}

define_id! {
    /// Identifier of a comment or reply.
    CommentId
}

define_id! {
    /// Identifier of a rating row.
    RatingId
}

define_id! {
    /// Identifier of a content item.
    ContentId
}

define_id! {
    /// Identifier of a user account.
    UserId
}
