//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Only the columns
//! this layer reads are declared for `users` and `contents`.

diesel::table! {
    /// User accounts; only existence is checked here.
    users (id) {
        /// Primary key.
        id -> Int8,
    }
}

diesel::table! {
    /// Content items; only existence is checked here.
    contents (id) {
        /// Primary key.
        id -> Int8,
    }
}

diesel::table! {
    /// Category forest. `name` carries a unique index and `parent_id`
    /// references `categories.id` with `ON DELETE SET NULL`.
    categories (id) {
        /// Primary key.
        id -> Int8,
        /// Unique, case-sensitive name (max 100 characters).
        name -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Parent category, null for roots.
        parent_id -> Nullable<Int8>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments and replies. `parent_id` cascades on delete.
    comments (id) {
        /// Primary key.
        id -> Int8,
        /// Comment text (1 to 1000 characters).
        body -> Text,
        /// Author.
        user_id -> Int8,
        /// Content item.
        content_id -> Int8,
        /// Parent comment, null for root comments.
        parent_id -> Nullable<Int8>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Likes. Unique on `(user_id, content_id)`.
    ratings (id) {
        /// Primary key.
        id -> Int8,
        /// Stored value (1 to 5; the toggle writes 1).
        value -> Int2,
        /// Rating user.
        user_id -> Int8,
        /// Rated content item.
        content_id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(categories, comments, contents, ratings, users);
