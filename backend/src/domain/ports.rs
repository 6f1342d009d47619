//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters.
//! Implementations live in `outbound::persistence` (Diesel/PostgreSQL) and
//! `outbound::memory` (in-process, used by tests and database-less runs).
//!
//! Write operations that enforce ownership take an optional `owner` scope:
//! `Some(id)` additionally filters the mutation by owner equality as
//! defence-in-depth, `None` is the admin path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error as ThisError;
use uuid::Uuid;

use super::badge::{Badge, UserBadge};
use super::comment::{Comment, CommentId, ResourceRef};
use super::error::Error;
use super::failure_log::{FailureLog, FailureLogId, FailureLogPatch};
use super::mentor::{ApplicationId, ApplicationStatus, MentorApplication};
use super::project::{Project, ProjectId, ProjectPatch};
use super::review::MentorReview;
use super::tokens::{LedgerEntry, TokenAward, TokenBalance};
use super::user::{Role, User, UserId, Username};

/// Failures surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum PersistenceError {
    /// Connectivity or pool checkout failures.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query construction or execution failures.
    #[error("store query failed: {message}")]
    Query { message: String },
    /// A uniqueness constraint rejected the write.
    #[error("store conflict: {message}")]
    Conflict { message: String },
    /// The targeted row does not exist (or is outside the owner scope).
    #[error("record not found")]
    NotFound,
}

impl PersistenceError {
    /// Helper for connection-level failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl From<PersistenceError> for Error {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Connection { message } | PersistenceError::Query { message } => {
                Error::internal(message)
            }
            PersistenceError::Conflict { message } => Error::conflict(message),
            PersistenceError::NotFound => Error::not_found("record not found"),
        }
    }
}

/// Stored credentials for a login handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: String,
}

/// User accounts and role mutations.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a new account with its password hash.
    ///
    /// Fails with [`PersistenceError::Conflict`] when the username is taken.
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError>;

    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, PersistenceError>;

    /// Fetch stored credentials for authentication.
    async fn credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, PersistenceError>;

    /// Mutate the account role. Only the admin approval path calls this.
    async fn set_role(&self, id: UserId, role: Role) -> Result<(), PersistenceError>;

    /// Grant or revoke platform verification.
    async fn set_verified(&self, id: UserId, verified: bool) -> Result<(), PersistenceError>;
}

/// Project storage with slug-based lookup.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project.
    ///
    /// Fails with [`PersistenceError::Conflict`] when the slug is taken.
    async fn insert(&self, project: &Project) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, PersistenceError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, PersistenceError>;

    /// List projects, newest first, optionally scoped to one owner.
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, PersistenceError>;

    /// Slugs already taken that start with `prefix`, for collision resolution.
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PersistenceError>;

    /// Apply a patch, scoped by `owner` when present.
    async fn update(
        &self,
        id: ProjectId,
        owner: Option<UserId>,
        patch: &ProjectPatch,
    ) -> Result<Project, PersistenceError>;

    /// Delete, scoped by `owner` when present. Returns whether a row went away.
    async fn delete(&self, id: ProjectId, owner: Option<UserId>) -> Result<bool, PersistenceError>;
}

/// Failure log storage with visibility-aware listing.
#[async_trait]
pub trait FailureLogRepository: Send + Sync {
    async fn insert(&self, log: &FailureLog) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: FailureLogId) -> Result<Option<FailureLog>, PersistenceError>;

    /// List logs readable by `viewer`, newest first: all public logs plus the
    /// viewer's own private ones.
    async fn list_visible_to(
        &self,
        viewer: Option<UserId>,
    ) -> Result<Vec<FailureLog>, PersistenceError>;

    /// Apply a patch, scoped by `owner` when present.
    async fn update(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
        patch: &FailureLogPatch,
    ) -> Result<FailureLog, PersistenceError>;

    /// Delete, scoped by `owner` when present. Returns whether a row went away.
    async fn delete(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
    ) -> Result<bool, PersistenceError>;

    /// Number of logs authored by `owner`; drives the first-log badge check.
    async fn count_for_owner(&self, owner: UserId) -> Result<i64, PersistenceError>;
}

/// Comment storage, including helpful marks.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, PersistenceError>;

    /// Comments attached to a resource, oldest first.
    async fn list_for_target(&self, target: ResourceRef)
    -> Result<Vec<Comment>, PersistenceError>;

    /// Record a helpful mark. Returns `false` when `(user, comment)` already
    /// marked.
    async fn add_helpful_mark(
        &self,
        comment: CommentId,
        user: UserId,
    ) -> Result<bool, PersistenceError>;

    /// Delete, scoped by `author` when present. Returns whether a row went away.
    async fn delete(
        &self,
        id: CommentId,
        author: Option<UserId>,
    ) -> Result<bool, PersistenceError>;
}

/// Mentor application storage: at most one row per applicant.
#[async_trait]
pub trait MentorApplicationRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<MentorApplication>, PersistenceError>;

    async fn find_by_applicant(
        &self,
        applicant: UserId,
    ) -> Result<Option<MentorApplication>, PersistenceError>;

    /// Insert the application, replacing any existing row for the same
    /// applicant (upsert on the applicant uniqueness constraint).
    async fn upsert(&self, application: &MentorApplication) -> Result<(), PersistenceError>;

    /// Record an admin decision.
    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewed_by: UserId,
        reviewed_at: DateTime<Utc>,
    ) -> Result<MentorApplication, PersistenceError>;

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<MentorApplication>, PersistenceError>;
}

/// Append-only token ledger with atomic balance upkeep.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Atomically append a ledger entry and credit the user's account.
    async fn award(&self, award: &TokenAward) -> Result<(), PersistenceError>;

    /// Current account state; zero balances for users never awarded.
    async fn balance(&self, user: UserId) -> Result<TokenBalance, PersistenceError>;

    /// Ledger entries for a user, newest first.
    async fn history(&self, user: UserId) -> Result<Vec<LedgerEntry>, PersistenceError>;
}

/// Badge catalogue and one-time grants.
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Badge>, PersistenceError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Badge>, PersistenceError>;

    /// Grant a badge once. Returns `false` when the user already holds it.
    async fn grant_once(&self, user: UserId, badge_id: Uuid) -> Result<bool, PersistenceError>;

    async fn badges_for_user(&self, user: UserId) -> Result<Vec<UserBadge>, PersistenceError>;
}

/// Mentor review storage: one review per `(reviewer, target)`.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review.
    ///
    /// Fails with [`PersistenceError::Conflict`] when the reviewer already
    /// reviewed this target.
    async fn insert(&self, review: &MentorReview) -> Result<(), PersistenceError>;

    async fn list_for_target(
        &self,
        target: ResourceRef,
    ) -> Result<Vec<MentorReview>, PersistenceError>;
}
