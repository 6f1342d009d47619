//! PostgreSQL-backed `BadgeRepository` implementation using Diesel ORM.
//!
//! Grants insert into `user_badges` with `ON CONFLICT DO NOTHING`; the
//! affected-row count tells the caller whether this grant was the first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::badge::{Badge, UserBadge};
use crate::domain::ports::{BadgeRepository, PersistenceError};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BadgeRow, NewUserBadgeRow};
use super::pool::DbPool;
use super::schema::{badges, user_badges};

/// Diesel-backed implementation of the `BadgeRepository` port.
#[derive(Clone)]
pub struct DieselBadgeRepository {
    pool: DbPool,
}

impl DieselBadgeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepository for DieselBadgeRepository {
    async fn list(&self) -> Result<Vec<Badge>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BadgeRow> = badges::table
            .select(BadgeRow::as_select())
            .order_by(badges::code.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(BadgeRow::into_domain).collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Badge>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BadgeRow> = badges::table
            .filter(badges::code.eq(code))
            .select(BadgeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(BadgeRow::into_domain))
    }

    async fn grant_once(&self, user: UserId, badge_id: Uuid) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserBadgeRow {
            user_id: user.as_uuid(),
            badge_id,
        };

        let inserted = diesel::insert_into(user_badges::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted > 0)
    }

    async fn badges_for_user(&self, user: UserId) -> Result<Vec<UserBadge>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(BadgeRow, DateTime<Utc>)> = user_badges::table
            .inner_join(badges::table.on(badges::id.eq(user_badges::badge_id)))
            .filter(user_badges::user_id.eq(user.as_uuid()))
            .select((BadgeRow::as_select(), user_badges::granted_at))
            .order_by(user_badges::granted_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(badge, granted_at)| UserBadge {
                user_id: user,
                badge: badge.into_domain(),
                granted_at,
            })
            .collect())
    }
}
