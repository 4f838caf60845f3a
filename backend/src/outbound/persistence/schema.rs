//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// User accounts.
    users (id) {
        /// 12-byte record key.
        id -> Bytea,
        /// Display name, 2 to 100 characters.
        name -> Varchar,
        /// Contact email. Not unique.
        email -> Varchar,
        /// Whether the account is active.
        is_active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User groups with an embedded member list.
    groups (id) {
        /// 12-byte record key.
        id -> Bytea,
        /// Display name, 2 to 100 characters.
        name -> Varchar,
        /// Encoded user identifiers. Not checked against `users`.
        members -> Array<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, groups);
