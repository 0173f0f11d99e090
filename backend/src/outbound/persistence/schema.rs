//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly; `diesel print-schema` against a
//! migrated database regenerates them.

diesel::table! {
    /// Registered accounts. `username` and `email` carry UNIQUE constraints.
    users (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        /// Argon2id hash, base64 without padding.
        password_hash -> Text,
        /// Salt used for `password_hash`, base64 without padding.
        password_salt -> Text,
        bio -> Nullable<Text>,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued bearer tokens, at most one per user.
    tokens (id) {
        id -> Uuid,
        token -> Text,
        created_at -> Timestamptz,
        end_date -> Timestamptz,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Follow edges: `sub_id` follows `target_user_id`.
    subscriptions (sub_id, target_user_id) {
        sub_id -> Uuid,
        target_user_id -> Uuid,
    }
}

diesel::table! {
    article (slug) {
        slug -> Text,
        title -> Text,
        description -> Text,
        body -> Text,
        taglist -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        favorites_count -> Int4,
        /// Author username at creation time.
        author -> Text,
    }
}

diesel::joinable!(tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, tokens, subscriptions, article);
