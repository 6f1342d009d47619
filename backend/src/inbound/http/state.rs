//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BadgeRepository, CommentRepository, FailureLogRepository, MentorApplicationRepository,
    ProjectRepository, ReviewRepository, TokenLedger, UsersRepository,
};
use crate::domain::user::UserId;
use crate::domain::{Error, MentorService, RewardService, User};
use crate::outbound::memory::{
    MemoryBadgeRepository, MemoryCommentRepository, MemoryFailureLogRepository,
    MemoryMentorApplicationRepository, MemoryProjectRepository, MemoryReviewRepository,
    MemoryTokenLedger, MemoryUsersRepository,
};

use super::session::SessionContext;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UsersRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub failure_logs: Arc<dyn FailureLogRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub applications: Arc<dyn MentorApplicationRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub ledger: Arc<dyn TokenLedger>,
    pub badges: Arc<dyn BadgeRepository>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub failure_logs: Arc<dyn FailureLogRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub ledger: Arc<dyn TokenLedger>,
    pub badges: Arc<dyn BadgeRepository>,
    pub rewards: RewardService,
    pub mentor: MentorService,
}

impl HttpState {
    /// Construct state from a ports bundle, wiring the domain services.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            projects,
            failure_logs,
            comments,
            applications,
            reviews,
            ledger,
            badges,
        } = ports;
        let rewards = RewardService::new(ledger.clone(), badges.clone());
        let mentor = MentorService::new(applications, users.clone(), rewards.clone());
        Self {
            users,
            projects,
            failure_logs,
            comments,
            reviews,
            ledger,
            badges,
            rewards,
            mentor,
        }
    }

    /// State backed entirely by in-memory adapters.
    ///
    /// Used by handler tests and by server runs without a configured
    /// database.
    pub fn memory() -> Self {
        Self::new(HttpStatePorts {
            users: Arc::new(MemoryUsersRepository::default()),
            projects: Arc::new(MemoryProjectRepository::default()),
            failure_logs: Arc::new(MemoryFailureLogRepository::default()),
            comments: Arc::new(MemoryCommentRepository::default()),
            applications: Arc::new(MemoryMentorApplicationRepository::default()),
            reviews: Arc::new(MemoryReviewRepository::default()),
            ledger: Arc::new(MemoryTokenLedger::default()),
            badges: Arc::new(MemoryBadgeRepository::with_default_catalogue()),
        })
    }

    /// Resolve the session to a full user record.
    ///
    /// A session naming a user that no longer exists is treated as
    /// unauthenticated rather than an internal error.
    pub async fn current_user(&self, session: &SessionContext) -> Result<User, Error> {
        let user_id = session.require_user_id()?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

/// Require ownership (or admin) before a mutation, returning the owner scope
/// to pass to the store as defence-in-depth.
///
/// `None` is the admin path: the store mutation is unscoped.
pub fn owner_scope(caller: &User, owner_id: UserId) -> Result<Option<UserId>, Error> {
    if caller.role.is_admin() {
        Ok(None)
    } else if caller.id == owner_id {
        Ok(Some(caller.id))
    } else {
        Err(Error::forbidden("you do not own this resource"))
    }
}
