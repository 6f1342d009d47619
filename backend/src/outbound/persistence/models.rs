//! Internal Diesel row structs.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. Conversions into domain types live alongside the rows so invalid
//! stored enum values surface as query errors rather than panics.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::badge::Badge;
use crate::domain::comment::{Comment, CommentId, ResourceRef};
use crate::domain::failure_log::{FailureLog, FailureLogId, Visibility};
use crate::domain::mentor::{ApplicationId, ApplicationStatus, MentorApplication};
use crate::domain::ports::PersistenceError;
use crate::domain::project::{Project, ProjectId, ProjectStatus};
use crate::domain::review::{MentorReview, ReviewId};
use crate::domain::slug::Slug;
use crate::domain::tokens::{LedgerEntry, TokenAction, TokenBalance};
use crate::domain::user::{DisplayName, Role, User, UserId, Username};

use super::schema::{
    badges, comments, failure_logs, helpful_marks, mentor_applications, mentor_reviews, projects,
    token_accounts, token_ledger, user_badges, users,
};

fn bad_row(message: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::query(format!("invalid stored value: {message}"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub verified: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, PersistenceError> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            username: Username::new(self.username).map_err(bad_row)?,
            display_name: DisplayName::new(self.display_name).map_err(bad_row)?,
            role: Role::parse(&self.role).map_err(bad_row)?,
            verified: self.verified,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub verified: bool,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub(crate) fn into_domain(self) -> Result<Project, PersistenceError> {
        Ok(Project {
            id: ProjectId(self.id),
            owner_id: UserId::from_uuid(self.owner_id),
            title: self.title,
            summary: self.summary,
            status: ProjectStatus::parse(&self.status).map_err(bad_row)?,
            slug: Slug::new(self.slug).map_err(bad_row)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub summary: &'a str,
    pub status: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
pub(crate) struct ProjectChangeset<'a> {
    pub title: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub status: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Failure logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = failure_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FailureLogRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub what_happened: String,
    pub lessons_learned: String,
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FailureLogRow {
    pub(crate) fn into_domain(self) -> Result<FailureLog, PersistenceError> {
        Ok(FailureLog {
            id: FailureLogId(self.id),
            owner_id: UserId::from_uuid(self.owner_id),
            project_id: self.project_id.map(ProjectId),
            title: self.title,
            what_happened: self.what_happened,
            lessons_learned: self.lessons_learned,
            visibility: Visibility::parse(&self.visibility).map_err(bad_row)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = failure_logs)]
pub(crate) struct NewFailureLogRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: &'a str,
    pub what_happened: &'a str,
    pub lessons_learned: &'a str,
    pub visibility: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = failure_logs)]
pub(crate) struct FailureLogChangeset<'a> {
    pub title: Option<&'a str>,
    pub what_happened: Option<&'a str>,
    pub lessons_learned: Option<&'a str>,
    pub visibility: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Comments and helpful marks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub helpful_count: i64,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) fn into_domain(self) -> Result<Comment, PersistenceError> {
        let target = ResourceRef::from_parts(&self.target_kind, self.target_id)
            .ok_or_else(|| bad_row(format!("unknown comment target kind {}", self.target_kind)))?;
        Ok(Comment {
            id: CommentId(self.id),
            author_id: UserId::from_uuid(self.author_id),
            target,
            parent_id: self.parent_id.map(CommentId),
            body: self.body,
            helpful_count: self.helpful_count,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub target_kind: &'a str,
    pub target_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = helpful_marks)]
pub(crate) struct NewHelpfulMarkRow {
    pub comment_id: Uuid,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Mentor applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mentor_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MentorApplicationRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub motivation: String,
    pub expertise: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl MentorApplicationRow {
    pub(crate) fn into_domain(self) -> Result<MentorApplication, PersistenceError> {
        Ok(MentorApplication {
            id: ApplicationId(self.id),
            applicant_id: UserId::from_uuid(self.applicant_id),
            motivation: self.motivation,
            expertise: self.expertise,
            status: ApplicationStatus::parse(&self.status).map_err(bad_row)?,
            submitted_at: self.submitted_at,
            reviewed_by: self.reviewed_by.map(UserId::from_uuid),
            reviewed_at: self.reviewed_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mentor_applications)]
pub(crate) struct NewMentorApplicationRow<'a> {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub motivation: &'a str,
    pub expertise: &'a str,
    pub status: &'a str,
    pub submitted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = token_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TokenAccountRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
}

impl TokenAccountRow {
    pub(crate) fn into_domain(self) -> TokenBalance {
        TokenBalance {
            user_id: UserId::from_uuid(self.user_id),
            balance: self.balance,
            total_earned: self.total_earned,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = token_accounts)]
pub(crate) struct NewTokenAccountRow {
    pub user_id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = token_ledger)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub amount: i64,
    pub reference: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntryRow {
    pub(crate) fn into_domain(self) -> Result<LedgerEntry, PersistenceError> {
        let action = TokenAction::parse(&self.action)
            .ok_or_else(|| bad_row(format!("unknown token action {}", self.action)))?;
        Ok(LedgerEntry {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            action,
            amount: self.amount,
            reference: self.reference,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = token_ledger)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: &'a str,
    pub amount: i64,
    pub reference: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = badges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BadgeRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
}

impl BadgeRow {
    pub(crate) fn into_domain(self) -> Badge {
        Badge {
            id: self.id,
            code: self.code,
            name: self.name,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_badges)]
pub(crate) struct NewUserBadgeRow {
    pub user_id: Uuid,
    pub badge_id: Uuid,
}

// ---------------------------------------------------------------------------
// Mentor reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mentor_reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MentorReviewRow {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub feedback: String,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

impl MentorReviewRow {
    pub(crate) fn into_domain(self) -> Result<MentorReview, PersistenceError> {
        let target = ResourceRef::from_parts(&self.target_kind, self.target_id)
            .ok_or_else(|| bad_row(format!("unknown review target kind {}", self.target_kind)))?;
        Ok(MentorReview {
            id: ReviewId(self.id),
            reviewer_id: UserId::from_uuid(self.reviewer_id),
            target,
            feedback: self.feedback,
            rating: self.rating,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mentor_reviews)]
pub(crate) struct NewMentorReviewRow<'a> {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub target_kind: &'a str,
    pub target_id: Uuid,
    pub feedback: &'a str,
    pub rating: Option<i16>,
}
