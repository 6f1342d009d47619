//! PostgreSQL-backed `CommentRepository` implementation using Diesel ORM.
//!
//! Helpful marks and the denormalised `helpful_count` are kept consistent by
//! running the mark insert and the counter bump inside one transaction; the
//! composite primary key on `helpful_marks` makes repeat marks a no-op.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::comment::{Comment, CommentId, ResourceRef};
use crate::domain::ports::{CommentRepository, PersistenceError};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow, NewHelpfulMarkRow};
use super::pool::DbPool;
use super::schema::{comments, helpful_marks};

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewCommentRow {
            id: comment.id.0,
            author_id: comment.author_id.as_uuid(),
            target_kind: comment.target.kind(),
            target_id: comment.target.target_uuid(),
            parent_id: comment.parent_id.map(|id| id.0),
            body: &comment.body,
        };

        diesel::insert_into(comments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CommentRow> = comments::table
            .filter(comments::id.eq(id.0))
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(CommentRow::into_domain).transpose()
    }

    async fn list_for_target(
        &self,
        target: ResourceRef,
    ) -> Result<Vec<Comment>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommentRow> = comments::table
            .filter(
                comments::target_kind
                    .eq(target.kind())
                    .and(comments::target_id.eq(target.target_uuid())),
            )
            .select(CommentRow::as_select())
            .order_by(comments::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(CommentRow::into_domain).collect()
    }

    async fn add_helpful_mark(
        &self,
        comment: CommentId,
        user: UserId,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mark = NewHelpfulMarkRow {
            comment_id: comment.0,
            user_id: user.as_uuid(),
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let inserted = diesel::insert_into(helpful_marks::table)
                    .values(&mark)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;

                if inserted == 0 {
                    return Ok(false);
                }

                let bumped = diesel::update(comments::table)
                    .filter(comments::id.eq(comment.0))
                    .set(comments::helpful_count.eq(comments::helpful_count + 1))
                    .execute(conn)
                    .await?;

                if bumped == 0 {
                    return Err(diesel::result::Error::NotFound);
                }
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        id: CommentId,
        author: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = match author {
            Some(author) => {
                diesel::delete(comments::table)
                    .filter(
                        comments::id
                            .eq(id.0)
                            .and(comments::author_id.eq(author.as_uuid())),
                    )
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::delete(comments::table)
                    .filter(comments::id.eq(id.0))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
