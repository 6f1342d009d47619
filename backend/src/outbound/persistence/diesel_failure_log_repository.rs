//! PostgreSQL-backed `FailureLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::failure_log::{FailureLog, FailureLogId, FailureLogPatch, Visibility};
use crate::domain::ports::{FailureLogRepository, PersistenceError};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FailureLogChangeset, FailureLogRow, NewFailureLogRow};
use super::pool::DbPool;
use super::schema::failure_logs;

/// Diesel-backed implementation of the `FailureLogRepository` port.
#[derive(Clone)]
pub struct DieselFailureLogRepository {
    pool: DbPool,
}

impl DieselFailureLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FailureLogRepository for DieselFailureLogRepository {
    async fn insert(&self, log: &FailureLog) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewFailureLogRow {
            id: log.id.0,
            owner_id: log.owner_id.as_uuid(),
            project_id: log.project_id.map(|id| id.0),
            title: &log.title,
            what_happened: &log.what_happened,
            lessons_learned: &log.lessons_learned,
            visibility: log.visibility.as_str(),
        };

        diesel::insert_into(failure_logs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: FailureLogId) -> Result<Option<FailureLog>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FailureLogRow> = failure_logs::table
            .filter(failure_logs::id.eq(id.0))
            .select(FailureLogRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(FailureLogRow::into_domain).transpose()
    }

    async fn list_visible_to(
        &self,
        viewer: Option<UserId>,
    ) -> Result<Vec<FailureLog>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = failure_logs::table.into_boxed();
        query = match viewer {
            Some(viewer) => query.filter(
                failure_logs::visibility
                    .eq(Visibility::Public.as_str())
                    .or(failure_logs::owner_id.eq(viewer.as_uuid())),
            ),
            None => query.filter(failure_logs::visibility.eq(Visibility::Public.as_str())),
        };

        let rows: Vec<FailureLogRow> = query
            .select(FailureLogRow::as_select())
            .order_by(failure_logs::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(FailureLogRow::into_domain).collect()
    }

    async fn update(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
        patch: &FailureLogPatch,
    ) -> Result<FailureLog, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = FailureLogChangeset {
            title: patch.title.as_deref(),
            what_happened: patch.what_happened.as_deref(),
            lessons_learned: patch.lessons_learned.as_deref(),
            visibility: patch.visibility.map(|visibility| visibility.as_str()),
            updated_at: Utc::now(),
        };

        let row: Option<FailureLogRow> = match owner {
            Some(owner) => {
                diesel::update(failure_logs::table)
                    .filter(
                        failure_logs::id
                            .eq(id.0)
                            .and(failure_logs::owner_id.eq(owner.as_uuid())),
                    )
                    .set(&changeset)
                    .returning(FailureLogRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            None => {
                diesel::update(failure_logs::table)
                    .filter(failure_logs::id.eq(id.0))
                    .set(&changeset)
                    .returning(FailureLogRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;

        row.ok_or(PersistenceError::NotFound)?.into_domain()
    }

    async fn delete(
        &self,
        id: FailureLogId,
        owner: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = match owner {
            Some(owner) => {
                diesel::delete(failure_logs::table)
                    .filter(
                        failure_logs::id
                            .eq(id.0)
                            .and(failure_logs::owner_id.eq(owner.as_uuid())),
                    )
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::delete(failure_logs::table)
                    .filter(failure_logs::id.eq(id.0))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn count_for_owner(&self, owner: UserId) -> Result<i64, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        failure_logs::table
            .filter(failure_logs::owner_id.eq(owner.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
