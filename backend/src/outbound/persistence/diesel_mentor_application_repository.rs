//! PostgreSQL-backed `MentorApplicationRepository` implementation using Diesel ORM.
//!
//! The `applicant_id` unique constraint keeps at most one application per
//! user; resubmission after a rejection replaces the row in place via an
//! upsert that also clears the previous decision.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::mentor::{ApplicationId, ApplicationStatus, MentorApplication};
use crate::domain::ports::{MentorApplicationRepository, PersistenceError};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{MentorApplicationRow, NewMentorApplicationRow};
use super::pool::DbPool;
use super::schema::mentor_applications;

/// Diesel-backed implementation of the `MentorApplicationRepository` port.
#[derive(Clone)]
pub struct DieselMentorApplicationRepository {
    pool: DbPool,
}

impl DieselMentorApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MentorApplicationRepository for DieselMentorApplicationRepository {
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<MentorApplication>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MentorApplicationRow> = mentor_applications::table
            .filter(mentor_applications::id.eq(id.0))
            .select(MentorApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(MentorApplicationRow::into_domain).transpose()
    }

    async fn find_by_applicant(
        &self,
        applicant: UserId,
    ) -> Result<Option<MentorApplication>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MentorApplicationRow> = mentor_applications::table
            .filter(mentor_applications::applicant_id.eq(applicant.as_uuid()))
            .select(MentorApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(MentorApplicationRow::into_domain).transpose()
    }

    async fn upsert(&self, application: &MentorApplication) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewMentorApplicationRow {
            id: application.id.0,
            applicant_id: application.applicant_id.as_uuid(),
            motivation: &application.motivation,
            expertise: &application.expertise,
            status: application.status.as_str(),
            submitted_at: application.submitted_at,
        };

        diesel::insert_into(mentor_applications::table)
            .values(&row)
            .on_conflict(mentor_applications::applicant_id)
            .do_update()
            .set((
                mentor_applications::motivation.eq(excluded(mentor_applications::motivation)),
                mentor_applications::expertise.eq(excluded(mentor_applications::expertise)),
                mentor_applications::status.eq(excluded(mentor_applications::status)),
                mentor_applications::submitted_at.eq(excluded(mentor_applications::submitted_at)),
                mentor_applications::reviewed_by.eq(None::<Uuid>),
                mentor_applications::reviewed_at.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
        reviewed_by: UserId,
        reviewed_at: DateTime<Utc>,
    ) -> Result<MentorApplication, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<MentorApplicationRow> = diesel::update(mentor_applications::table)
            .filter(mentor_applications::id.eq(id.0))
            .set((
                mentor_applications::status.eq(status.as_str()),
                mentor_applications::reviewed_by.eq(reviewed_by.as_uuid()),
                mentor_applications::reviewed_at.eq(reviewed_at),
            ))
            .returning(MentorApplicationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.ok_or(PersistenceError::NotFound)?.into_domain()
    }

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<MentorApplication>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MentorApplicationRow> = mentor_applications::table
            .filter(mentor_applications::status.eq(status.as_str()))
            .select(MentorApplicationRow::as_select())
            .order_by(mentor_applications::submitted_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(MentorApplicationRow::into_domain)
            .collect()
    }
}
