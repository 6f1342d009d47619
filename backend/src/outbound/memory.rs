//! In-memory port implementations.
//!
//! These adapters back the HTTP layer when no `DATABASE_URL` is configured
//! and serve as test doubles for handler and service tests. State lives in
//! mutex-guarded maps; semantics mirror the Diesel adapters, including
//! conflict behaviour on uniqueness violations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::badge::{self, Badge, UserBadge};
use crate::domain::comment::{Comment, CommentId, ResourceRef};
use crate::domain::failure_log::{FailureLog, FailureLogId, FailureLogPatch, Visibility};
use crate::domain::mentor::{ApplicationId, ApplicationStatus, MentorApplication};
use crate::domain::ports::{
    BadgeRepository, CommentRepository, FailureLogRepository, MentorApplicationRepository,
    PersistenceError, ProjectRepository, ReviewRepository, StoredCredentials, TokenLedger,
    UsersRepository,
};
use crate::domain::project::{Project, ProjectId, ProjectPatch};
use crate::domain::review::MentorReview;
use crate::domain::tokens::{LedgerEntry, TokenAward, TokenBalance};
use crate::domain::user::{DisplayName, Role, User, UserId, Username};

fn lock_poisoned() -> PersistenceError {
    PersistenceError::connection("memory store lock poisoned")
}

/// In-memory [`UsersRepository`].
#[derive(Default)]
pub struct MemoryUsersRepository {
    users: Mutex<HashMap<UserId, (User, String)>>,
}

impl MemoryUsersRepository {
    /// Insert a user directly, bypassing registration. Test convenience.
    pub async fn seed_user(&self, username: &str, role: Role) -> Result<UserId, PersistenceError> {
        let user = User {
            id: UserId::random(),
            username: Username::new(username)
                .map_err(|err| PersistenceError::query(err.to_string()))?,
            display_name: DisplayName::new("Seeded User")
                .map_err(|err| PersistenceError::query(err.to_string()))?,
            role,
            verified: false,
            created_at: Utc::now(),
        };
        let id = user.id;
        self.insert(&user, "unusable-hash").await?;
        Ok(id)
    }
}

#[async_trait]
impl UsersRepository for MemoryUsersRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), PersistenceError> {
        let mut users = self.users.lock().map_err(|_| lock_poisoned())?;
        if users
            .values()
            .any(|(existing, _)| existing.username == user.username)
        {
            return Err(PersistenceError::conflict("username already taken"));
        }
        users.insert(user.id, (user.clone(), password_hash.to_owned()));
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        let users = self.users.lock().map_err(|_| lock_poisoned())?;
        Ok(users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, PersistenceError> {
        let users = self.users.lock().map_err(|_| lock_poisoned())?;
        Ok(users
            .values()
            .find(|(user, _)| &user.username == username)
            .map(|(user, _)| user.clone()))
    }

    async fn credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, PersistenceError> {
        let users = self.users.lock().map_err(|_| lock_poisoned())?;
        Ok(users
            .values()
            .find(|(user, _)| &user.username == username)
            .map(|(user, hash)| StoredCredentials {
                user_id: user.id,
                password_hash: hash.clone(),
            }))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), PersistenceError> {
        let mut users = self.users.lock().map_err(|_| lock_poisoned())?;
        let (user, _) = users.get_mut(&id).ok_or(PersistenceError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn set_verified(&self, id: UserId, verified: bool) -> Result<(), PersistenceError> {
        let mut users = self.users.lock().map_err(|_| lock_poisoned())?;
        let (user, _) = users.get_mut(&id).ok_or(PersistenceError::NotFound)?;
        user.verified = verified;
        Ok(())
    }
}

/// In-memory [`ProjectRepository`].
#[derive(Default)]
pub struct MemoryProjectRepository {
    projects: Mutex<HashMap<ProjectId, Project>>,
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), PersistenceError> {
        let mut projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        if projects
            .values()
            .any(|existing| existing.slug == project.slug)
        {
            return Err(PersistenceError::conflict("slug already taken"));
        }
        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, PersistenceError> {
        let projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        Ok(projects.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, PersistenceError> {
        let projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        Ok(projects
            .values()
            .find(|project| project.slug.as_str() == slug)
            .cloned())
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, PersistenceError> {
        let projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<Project> = projects
            .values()
            .filter(|project| owner.is_none_or(|owner| project.owner_id == owner))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        let projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        Ok(projects
            .values()
            .filter(|project| project.slug.as_str().starts_with(prefix))
            .map(|project| project.slug.as_str().to_owned())
            .collect())
    }

    async fn update(
        &self,
        id: ProjectId,
        owner: Option<UserId>,
        patch: &ProjectPatch,
    ) -> Result<Project, PersistenceError> {
        let mut projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        let project = projects
            .get_mut(&id)
            .filter(|project| owner.is_none_or(|owner| project.owner_id == owner))
            .ok_or(PersistenceError::NotFound)?;
        if let Some(title) = &patch.title {
            project.title = title.clone();
        }
        if let Some(summary) = &patch.summary {
            project.summary = summary.clone();
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete(&self, id: ProjectId, owner: Option<UserId>) -> Result<bool, PersistenceError> {
        let mut projects = self.projects.lock().map_err(|_| lock_poisoned())?;
        let in_scope = projects
            .get(&id)
            .is_some_and(|project| owner.is_none_or(|owner| project.owner_id == owner));
        if in_scope {
            projects.remove(&id);
        }
        Ok(in_scope)
    }
}

/// In-memory [`FailureLogRepository`].
#[derive(Default)]
pub struct MemoryFailureLogRepository {
    logs: Mutex<HashMap<FailureLogId, FailureLog>>,
}

#[async_trait]
impl FailureLogRepository for MemoryFailureLogRepository {
    async fn insert(&self, log: &FailureLog) -> Result<(), PersistenceError> {
        let mut logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: FailureLogId) -> Result<Option<FailureLog>, PersistenceError> {
        let logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        Ok(logs.get(&id).cloned())
    }

    async fn list_visible_to(
        &self,
        viewer: Option<UserId>,
    ) -> Result<Vec<FailureLog>, PersistenceError> {
        let logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<FailureLog> = logs
            .values()
            .filter(|log| {
                log.visibility == Visibility::Public || viewer == Some(log.owner_id)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn update(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
        patch: &FailureLogPatch,
    ) -> Result<FailureLog, PersistenceError> {
        let mut logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        let log = logs
            .get_mut(&id)
            .filter(|log| owner.is_none_or(|owner| log.owner_id == owner))
            .ok_or(PersistenceError::NotFound)?;
        if let Some(title) = &patch.title {
            log.title = title.clone();
        }
        if let Some(text) = &patch.what_happened {
            log.what_happened = text.clone();
        }
        if let Some(text) = &patch.lessons_learned {
            log.lessons_learned = text.clone();
        }
        if let Some(visibility) = patch.visibility {
            log.visibility = visibility;
        }
        log.updated_at = Utc::now();
        Ok(log.clone())
    }

    async fn delete(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        let mut logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        let in_scope = logs
            .get(&id)
            .is_some_and(|log| owner.is_none_or(|owner| log.owner_id == owner));
        if in_scope {
            logs.remove(&id);
        }
        Ok(in_scope)
    }

    async fn count_for_owner(&self, owner: UserId) -> Result<i64, PersistenceError> {
        let logs = self.logs.lock().map_err(|_| lock_poisoned())?;
        Ok(logs.values().filter(|log| log.owner_id == owner).count() as i64)
    }
}

/// In-memory [`CommentRepository`].
#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: Mutex<HashMap<CommentId, Comment>>,
    helpful_marks: Mutex<Vec<(CommentId, UserId)>>,
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), PersistenceError> {
        let mut comments = self.comments.lock().map_err(|_| lock_poisoned())?;
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, PersistenceError> {
        let comments = self.comments.lock().map_err(|_| lock_poisoned())?;
        Ok(comments.get(&id).cloned())
    }

    async fn list_for_target(
        &self,
        target: ResourceRef,
    ) -> Result<Vec<Comment>, PersistenceError> {
        let comments = self.comments.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<Comment> = comments
            .values()
            .filter(|comment| comment.target == target)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn add_helpful_mark(
        &self,
        comment: CommentId,
        user: UserId,
    ) -> Result<bool, PersistenceError> {
        let mut marks = self.helpful_marks.lock().map_err(|_| lock_poisoned())?;
        if marks.contains(&(comment, user)) {
            return Ok(false);
        }
        marks.push((comment, user));
        drop(marks);
        let mut comments = self.comments.lock().map_err(|_| lock_poisoned())?;
        if let Some(comment) = comments.get_mut(&comment) {
            comment.helpful_count += 1;
        }
        Ok(true)
    }

    async fn delete(
        &self,
        id: CommentId,
        author: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        let mut comments = self.comments.lock().map_err(|_| lock_poisoned())?;
        let in_scope = comments
            .get(&id)
            .is_some_and(|comment| author.is_none_or(|author| comment.author_id == author));
        if in_scope {
            comments.remove(&id);
        }
        Ok(in_scope)
    }
}

/// In-memory [`MentorApplicationRepository`].
#[derive(Default)]
pub struct MemoryMentorApplicationRepository {
    applications: Mutex<HashMap<ApplicationId, MentorApplication>>,
}

#[async_trait]
impl MentorApplicationRepository for MemoryMentorApplicationRepository {
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<MentorApplication>, PersistenceError> {
        let applications = self.applications.lock().map_err(|_| lock_poisoned())?;
        Ok(applications.get(&id).cloned())
    }

    async fn find_by_applicant(
        &self,
        applicant: UserId,
    ) -> Result<Option<MentorApplication>, PersistenceError> {
        let applications = self.applications.lock().map_err(|_| lock_poisoned())?;
        Ok(applications
            .values()
            .find(|application| application.applicant_id == applicant)
            .cloned())
    }

    async fn upsert(&self, application: &MentorApplication) -> Result<(), PersistenceError> {
        let mut applications = self.applications.lock().map_err(|_| lock_poisoned())?;
        applications.retain(|_, existing| existing.applicant_id != application.applicant_id);
        applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewed_by: UserId,
        reviewed_at: DateTime<Utc>,
    ) -> Result<MentorApplication, PersistenceError> {
        let mut applications = self.applications.lock().map_err(|_| lock_poisoned())?;
        let application = applications.get_mut(&id).ok_or(PersistenceError::NotFound)?;
        application.status = status;
        application.reviewed_by = Some(reviewed_by);
        application.reviewed_at = Some(reviewed_at);
        Ok(application.clone())
    }

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<MentorApplication>, PersistenceError> {
        let applications = self.applications.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<MentorApplication> = applications
            .values()
            .filter(|application| application.status == status)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(out)
    }
}

/// In-memory [`TokenLedger`].
#[derive(Default)]
pub struct MemoryTokenLedger {
    accounts: Mutex<HashMap<UserId, TokenBalance>>,
    entries: Mutex<Vec<LedgerEntry>>,
}

#[async_trait]
impl TokenLedger for MemoryTokenLedger {
    async fn award(&self, award: &TokenAward) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().map_err(|_| lock_poisoned())?;
        entries.push(LedgerEntry {
            id: Uuid::new_v4(),
            user_id: award.user_id,
            action: award.action,
            amount: award.amount,
            reference: award.reference,
            created_at: Utc::now(),
        });
        drop(entries);
        let mut accounts = self.accounts.lock().map_err(|_| lock_poisoned())?;
        let account = accounts
            .entry(award.user_id)
            .or_insert_with(|| TokenBalance::empty(award.user_id));
        account.balance += award.amount;
        account.total_earned += award.amount;
        Ok(())
    }

    async fn balance(&self, user: UserId) -> Result<TokenBalance, PersistenceError> {
        let accounts = self.accounts.lock().map_err(|_| lock_poisoned())?;
        Ok(accounts
            .get(&user)
            .copied()
            .unwrap_or_else(|| TokenBalance::empty(user)))
    }

    async fn history(&self, user: UserId) -> Result<Vec<LedgerEntry>, PersistenceError> {
        let entries = self.entries.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<LedgerEntry> = entries
            .iter()
            .filter(|entry| entry.user_id == user)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

/// In-memory [`BadgeRepository`].
#[derive(Default)]
pub struct MemoryBadgeRepository {
    catalogue: Mutex<Vec<Badge>>,
    grants: Mutex<Vec<(UserId, Uuid, DateTime<Utc>)>>,
}

impl MemoryBadgeRepository {
    /// Build a repository seeded with the platform's workflow badges.
    pub fn with_default_catalogue() -> Self {
        Self {
            catalogue: Mutex::new(badge::default_catalogue()),
            grants: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BadgeRepository for MemoryBadgeRepository {
    async fn list(&self) -> Result<Vec<Badge>, PersistenceError> {
        let catalogue = self.catalogue.lock().map_err(|_| lock_poisoned())?;
        Ok(catalogue.clone())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Badge>, PersistenceError> {
        let catalogue = self.catalogue.lock().map_err(|_| lock_poisoned())?;
        Ok(catalogue.iter().find(|badge| badge.code == code).cloned())
    }

    async fn grant_once(&self, user: UserId, badge_id: Uuid) -> Result<bool, PersistenceError> {
        let mut grants = self.grants.lock().map_err(|_| lock_poisoned())?;
        if grants
            .iter()
            .any(|(holder, held, _)| *holder == user && *held == badge_id)
        {
            return Ok(false);
        }
        grants.push((user, badge_id, Utc::now()));
        Ok(true)
    }

    async fn badges_for_user(&self, user: UserId) -> Result<Vec<UserBadge>, PersistenceError> {
        let grants = self.grants.lock().map_err(|_| lock_poisoned())?;
        let catalogue = self.catalogue.lock().map_err(|_| lock_poisoned())?;
        Ok(grants
            .iter()
            .filter(|(holder, _, _)| *holder == user)
            .filter_map(|(_, badge_id, granted_at)| {
                catalogue
                    .iter()
                    .find(|badge| badge.id == *badge_id)
                    .map(|badge| UserBadge {
                        user_id: user,
                        badge: badge.clone(),
                        granted_at: *granted_at,
                    })
            })
            .collect())
    }
}

/// In-memory [`ReviewRepository`].
#[derive(Default)]
pub struct MemoryReviewRepository {
    reviews: Mutex<Vec<MentorReview>>,
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn insert(&self, review: &MentorReview) -> Result<(), PersistenceError> {
        let mut reviews = self.reviews.lock().map_err(|_| lock_poisoned())?;
        let duplicate = reviews
            .iter()
            .any(|existing| {
                existing.reviewer_id == review.reviewer_id && existing.target == review.target
            });
        if duplicate {
            return Err(PersistenceError::conflict(
                "target already reviewed by this mentor",
            ));
        }
        reviews.push(review.clone());
        Ok(())
    }

    async fn list_for_target(
        &self,
        target: ResourceRef,
    ) -> Result<Vec<MentorReview>, PersistenceError> {
        let reviews = self.reviews.lock().map_err(|_| lock_poisoned())?;
        let mut out: Vec<MentorReview> = reviews
            .iter()
            .filter(|review| review.target == target)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
