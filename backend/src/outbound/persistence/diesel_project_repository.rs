//! PostgreSQL-backed `ProjectRepository` implementation using Diesel ORM.
//!
//! Slug uniqueness is enforced by the database; the handler resolves
//! collisions up front via [`ProjectRepository::slugs_with_prefix`] and any
//! racing duplicate still surfaces as a conflict from the unique index.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, ProjectRepository};
use crate::domain::project::{Project, ProjectId, ProjectPatch};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProjectRow, ProjectChangeset, ProjectRow};
use super::pool::DbPool;
use super::schema::projects;

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewProjectRow {
            id: project.id.0,
            owner_id: project.owner_id.as_uuid(),
            title: &project.title,
            summary: &project.summary,
            status: project.status.as_str(),
            slug: project.slug.as_str(),
        };

        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .filter(projects::id.eq(id.0))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(ProjectRow::into_domain).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .filter(projects::slug.eq(slug))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(ProjectRow::into_domain).transpose()
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = projects::table.into_boxed();
        if let Some(owner) = owner {
            query = query.filter(projects::owner_id.eq(owner.as_uuid()));
        }

        let rows: Vec<ProjectRow> = query
            .select(ProjectRow::as_select())
            .order_by(projects::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(ProjectRow::into_domain).collect()
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Escape LIKE metacharacters so a title containing % or _ cannot
        // widen the candidate set.
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("{escaped}%");

        projects::table
            .filter(projects::slug.like(pattern))
            .select(projects::slug)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        id: ProjectId,
        owner: Option<UserId>,
        patch: &ProjectPatch,
    ) -> Result<Project, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ProjectChangeset {
            title: patch.title.as_deref(),
            summary: patch.summary.as_deref(),
            status: patch.status.map(|status| status.as_str()),
            updated_at: Utc::now(),
        };

        let row: Option<ProjectRow> = match owner {
            Some(owner) => {
                diesel::update(projects::table)
                    .filter(
                        projects::id
                            .eq(id.0)
                            .and(projects::owner_id.eq(owner.as_uuid())),
                    )
                    .set(&changeset)
                    .returning(ProjectRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
            None => {
                diesel::update(projects::table)
                    .filter(projects::id.eq(id.0))
                    .set(&changeset)
                    .returning(ProjectRow::as_returning())
                    .get_result(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;

        row.ok_or(PersistenceError::NotFound)?.into_domain()
    }

    async fn delete(&self, id: ProjectId, owner: Option<UserId>) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = match owner {
            Some(owner) => {
                diesel::delete(projects::table)
                    .filter(
                        projects::id
                            .eq(id.0)
                            .and(projects::owner_id.eq(owner.as_uuid())),
                    )
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::delete(projects::table)
                    .filter(projects::id.eq(id.0))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
