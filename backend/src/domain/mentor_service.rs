//! Mentor application workflow.
//!
//! Submission enforces the one-application-per-user guard; approval runs a
//! sequence of side effects that is deliberately not transactional. A
//! failure partway through leaves the system inconsistent but recoverable:
//! the broken step is logged at `warn` and the request still succeeds, per
//! the platform's original behaviour.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::badge;
use super::error::Error;
use super::mentor::{ApplicationDraft, ApplicationId, ApplicationStatus, MentorApplication};
use super::ports::{MentorApplicationRepository, UsersRepository};
use super::rewards::RewardService;
use super::tokens::TokenAction;
use super::user::{Role, UserId};

/// Orchestrates the mentor application state machine.
#[derive(Clone)]
pub struct MentorService {
    applications: Arc<dyn MentorApplicationRepository>,
    users: Arc<dyn UsersRepository>,
    rewards: RewardService,
}

impl MentorService {
    /// Build the service from its ports.
    pub fn new(
        applications: Arc<dyn MentorApplicationRepository>,
        users: Arc<dyn UsersRepository>,
        rewards: RewardService,
    ) -> Self {
        Self {
            applications,
            users,
            rewards,
        }
    }

    /// Submit an application for `applicant`.
    ///
    /// A pending or approved application blocks resubmission with a conflict
    /// error; a rejected one is replaced in place and returns to `pending`.
    pub async fn submit(
        &self,
        applicant: UserId,
        draft: ApplicationDraft,
    ) -> Result<MentorApplication, Error> {
        let existing = self.applications.find_by_applicant(applicant).await?;
        let id = match &existing {
            Some(previous) if !previous.status.allows_resubmission() => {
                return Err(Error::conflict(format!(
                    "an application is already {}",
                    previous.status
                )));
            }
            Some(previous) => previous.id,
            None => ApplicationId::random(),
        };

        let application = MentorApplication {
            id,
            applicant_id: applicant,
            motivation: draft.motivation,
            expertise: draft.expertise,
            status: ApplicationStatus::Pending,
            submitted_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
        };
        self.applications.upsert(&application).await?;
        Ok(application)
    }

    /// The caller's own application, if any.
    pub async fn application_for(
        &self,
        applicant: UserId,
    ) -> Result<Option<MentorApplication>, Error> {
        Ok(self.applications.find_by_applicant(applicant).await?)
    }

    /// Applications in a given state, for the admin dashboard.
    pub async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<MentorApplication>, Error> {
        Ok(self.applications.list_by_status(status).await?)
    }

    /// Approve a pending application.
    ///
    /// Side effects run in order: status update (primary), role promotion,
    /// verification, token award, mentor badge. Only the primary effect can
    /// fail the request; later failures log and continue.
    pub async fn approve(
        &self,
        id: ApplicationId,
        reviewer: UserId,
    ) -> Result<MentorApplication, Error> {
        let application = self.decide(id, reviewer, ApplicationStatus::Approved).await?;
        let applicant = application.applicant_id;

        if let Err(error) = self.users.set_role(applicant, Role::Mentor).await {
            warn!(%error, user_id = %applicant, "role promotion failed after approval");
        }
        if let Err(error) = self.users.set_verified(applicant, true).await {
            warn!(%error, user_id = %applicant, "verification grant failed after approval");
        }
        self.rewards
            .award(applicant, TokenAction::ApplicationApproved, Some(id.0))
            .await;
        self.rewards.grant_badge_once(applicant, badge::MENTOR).await;

        Ok(application)
    }

    /// Reject a pending application.
    pub async fn reject(
        &self,
        id: ApplicationId,
        reviewer: UserId,
    ) -> Result<MentorApplication, Error> {
        self.decide(id, reviewer, ApplicationStatus::Rejected).await
    }

    async fn decide(
        &self,
        id: ApplicationId,
        reviewer: UserId,
        status: ApplicationStatus,
    ) -> Result<MentorApplication, Error> {
        let application = self
            .applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("application not found"))?;
        if !application.status.is_decidable() {
            return Err(Error::conflict(format!(
                "application is already {}",
                application.status
            )));
        }
        Ok(self
            .applications
            .set_status(id, status, reviewer, Utc::now())
            .await?)
    }
}
