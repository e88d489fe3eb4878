//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Known end users and administrators.
    players (id) {
        id -> Uuid,
        /// Display casing as first entered; unique on `lower(username)`.
        username -> Varchar,
        /// `user` or `admin`.
        role -> Varchar,
        is_blocked -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Redeemable one-time codes.
    spin_codes (id) {
        id -> Uuid,
        /// Upper-cased, unique.
        code -> Varchar,
        /// `active`, `used`, `disabled` or `expired`.
        status -> Varchar,
        note -> Nullable<Text>,
        expires_at -> Nullable<Timestamptz>,
        /// Cleared when the player is deleted; the username is kept.
        used_by -> Nullable<Uuid>,
        used_by_username -> Nullable<Varchar>,
        used_at -> Nullable<Timestamptz>,
        prize -> Nullable<Varchar>,
        created_by -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Prize definitions in wheel order.
    prizes (id) {
        id -> Uuid,
        name -> Varchar,
        color -> Varchar,
        /// Relative weight in `0..=100`.
        probability -> Float8,
        is_active -> Bool,
        sort_order -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit log of successful spins.
    spin_logs (id) {
        id -> Uuid,
        code -> Varchar,
        prize -> Varchar,
        player_id -> Nullable<Uuid>,
        username -> Varchar,
        spun_at -> Timestamptz,
    }
}

diesel::joinable!(spin_codes -> players (used_by));
diesel::joinable!(spin_logs -> players (player_id));

diesel::allow_tables_to_appear_in_same_query!(players, prizes, spin_codes, spin_logs);
