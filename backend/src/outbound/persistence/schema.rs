//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the SQL migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// User accounts, including local credentials and the platform role.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        display_name -> Varchar,
        role -> Varchar,
        verified -> Bool,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student projects with unique title-derived slugs.
    projects (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        summary -> Text,
        status -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Failure logs, optionally linked to a project.
    failure_logs (id) {
        id -> Uuid,
        owner_id -> Uuid,
        project_id -> Nullable<Uuid>,
        title -> Varchar,
        what_happened -> Text,
        lessons_learned -> Text,
        visibility -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on projects and failure logs; replies nest one level.
    comments (id) {
        id -> Uuid,
        author_id -> Uuid,
        target_kind -> Varchar,
        target_id -> Uuid,
        parent_id -> Nullable<Uuid>,
        body -> Text,
        helpful_count -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Helpful marks; the composite key enforces one mark per (comment, user).
    helpful_marks (comment_id, user_id) {
        comment_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mentor applications; `applicant_id` carries a unique constraint.
    mentor_applications (id) {
        id -> Uuid,
        applicant_id -> Uuid,
        motivation -> Text,
        expertise -> Text,
        status -> Varchar,
        submitted_at -> Timestamptz,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Per-user token account; mutated only by the atomic award upsert.
    token_accounts (user_id) {
        user_id -> Uuid,
        balance -> Int8,
        total_earned -> Int8,
    }
}

diesel::table! {
    /// Append-only token ledger.
    token_ledger (id) {
        id -> Uuid,
        user_id -> Uuid,
        action -> Varchar,
        amount -> Int8,
        reference -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Badge catalogue.
    badges (id) {
        id -> Uuid,
        code -> Varchar,
        name -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    /// One-time badge grants; the composite key enforces uniqueness.
    user_badges (user_id, badge_id) {
        user_id -> Uuid,
        badge_id -> Uuid,
        granted_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mentor reviews; (reviewer_id, target_kind, target_id) is unique.
    mentor_reviews (id) {
        id -> Uuid,
        reviewer_id -> Uuid,
        target_kind -> Varchar,
        target_id -> Uuid,
        feedback -> Text,
        rating -> Nullable<Int2>,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    projects,
    failure_logs,
    comments,
    helpful_marks,
    mentor_applications,
    token_accounts,
    token_ledger,
    badges,
    user_badges,
    mentor_reviews,
);
