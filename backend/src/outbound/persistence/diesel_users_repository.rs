//! PostgreSQL-backed `UsersRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PersistenceError, StoredCredentials, UsersRepository};
use crate::domain::user::{Role, User, UserId, Username};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UsersRepository` port.
#[derive(Clone)]
pub struct DieselUsersRepository {
    pool: DbPool,
}

impl DieselUsersRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for DieselUsersRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: user.id.as_uuid(),
            username: user.username.as_str(),
            display_name: user.display_name.as_str(),
            role: user.role.as_str(),
            verified: user.verified,
            password_hash,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(uuid::Uuid, String)> = users::table
            .filter(users::username.eq(username.as_str()))
            .select((users::id, users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|(id, password_hash)| StoredCredentials {
            user_id: UserId::from_uuid(id),
            password_hash,
        }))
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table)
            .filter(users::id.eq(id.as_uuid()))
            .set((
                users::role.eq(role.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }

    async fn set_verified(&self, id: UserId, verified: bool) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table)
            .filter(users::id.eq(id.as_uuid()))
            .set((
                users::verified.eq(verified),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }
}
