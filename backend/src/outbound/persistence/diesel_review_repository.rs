//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::comment::ResourceRef;
use crate::domain::ports::{PersistenceError, ReviewRepository};
use crate::domain::review::MentorReview;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{MentorReviewRow, NewMentorReviewRow};
use super::pool::DbPool;
use super::schema::mentor_reviews;

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &MentorReview) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewMentorReviewRow {
            id: review.id.0,
            reviewer_id: review.reviewer_id.as_uuid(),
            target_kind: review.target.kind(),
            target_id: review.target.target_uuid(),
            feedback: &review.feedback,
            rating: review.rating,
        };

        diesel::insert_into(mentor_reviews::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_target(
        &self,
        target: ResourceRef,
    ) -> Result<Vec<MentorReview>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<MentorReviewRow> = mentor_reviews::table
            .filter(
                mentor_reviews::target_kind
                    .eq(target.kind())
                    .and(mentor_reviews::target_id.eq(target.target_uuid())),
            )
            .select(MentorReviewRow::as_select())
            .order_by(mentor_reviews::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(MentorReviewRow::into_domain).collect()
    }
}
