//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Residential communities.
    communities (id) {
        id -> Uuid,
        name -> Varchar,
        address -> Varchar,
        postal_code -> Varchar,
        /// Join code shared with residents; unique.
        code -> Varchar,
        president_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Registered accounts. `email` and `dni` are unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        dni -> Varchar,
        full_name -> Varchar,
        floor -> Varchar,
        /// PHC-encoded argon2 hash.
        password_hash -> Text,
        role -> Varchar,
        community_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    incidents (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Varchar,
        location -> Varchar,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
        state -> Varchar,
        author_id -> Uuid,
        community_id -> Uuid,
    }
}

diesel::table! {
    complaints (id) {
        id -> Uuid,
        content -> Varchar,
        anonymous -> Bool,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
        response -> Nullable<Varchar>,
        responded_at -> Nullable<Timestamptz>,
        author_id -> Uuid,
        community_id -> Uuid,
    }
}

diesel::table! {
    documents (id) {
        id -> Uuid,
        comment -> Nullable<Varchar>,
        doc_type -> Varchar,
        published_at -> Timestamptz,
        /// Stored file names; never empty.
        file_names -> Array<Text>,
        author_id -> Uuid,
        community_id -> Uuid,
    }
}

diesel::table! {
    posts (id) {
        id -> Uuid,
        title -> Varchar,
        content -> Varchar,
        author_id -> Uuid,
        community_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookable common zones; names are unique per community.
    zones (id) {
        id -> Uuid,
        name -> Varchar,
        community_id -> Uuid,
    }
}

diesel::table! {
    /// Zone bookings. Active rows of one zone never overlap
    /// (`reservations_no_overlap`).
    reservations (id) {
        id -> Uuid,
        zone_id -> Uuid,
        user_id -> Uuid,
        date -> Date,
        start_time -> Time,
        end_time -> Time,
        state -> Varchar,
        created_at -> Timestamptz,
        cancelled_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    polls (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Varchar,
        option1 -> Varchar,
        option2 -> Varchar,
        option3 -> Varchar,
        created_at -> Timestamptz,
        closes_at -> Timestamptz,
        creator_id -> Uuid,
        community_id -> Uuid,
    }
}

diesel::table! {
    /// One row per ballot; `(poll_id, user_id)` is unique.
    votes (id) {
        id -> Uuid,
        poll_id -> Uuid,
        user_id -> Uuid,
        option -> Varchar,
        cast_at -> Timestamptz,
    }
}

diesel::table! {
    chat_messages (id) {
        id -> Uuid,
        content -> Varchar,
        sender_name -> Varchar,
        origin_ip -> Varchar,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(users -> communities (community_id));
diesel::joinable!(incidents -> users (author_id));
diesel::joinable!(complaints -> users (author_id));
diesel::joinable!(documents -> users (author_id));
diesel::joinable!(posts -> users (author_id));
diesel::joinable!(reservations -> users (user_id));
diesel::joinable!(reservations -> zones (zone_id));
diesel::joinable!(votes -> polls (poll_id));

diesel::allow_tables_to_appear_in_same_query!(
    communities,
    users,
    incidents,
    complaints,
    documents,
    posts,
    zones,
    reservations,
    polls,
    votes,
    chat_messages,
);
