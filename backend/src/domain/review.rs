//! Mentor reviews of student work.
//!
//! A mentor may not review their own content and may review a given target
//! at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::comment::ResourceRef;
use super::user::UserId;

/// Maximum allowed length for review feedback.
pub const FEEDBACK_MAX: usize = 8000;

/// Validation errors for review fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("feedback must not be empty")]
    EmptyFeedback,
    #[error("feedback must be at most {max} characters")]
    FeedbackTooLong { max: usize },
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
}

/// Stable review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub Uuid);

impl ReviewId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mentor's feedback on a project or failure log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentorReview {
    #[schema(value_type = String)]
    pub id: ReviewId,
    #[schema(value_type = String)]
    pub reviewer_id: UserId,
    pub target: ResourceRef,
    pub feedback: String,
    /// Optional 1-5 quality rating.
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for submitting a review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub target: ResourceRef,
    pub feedback: String,
    pub rating: Option<i16>,
}

impl ReviewDraft {
    /// Validate feedback and rating range.
    pub fn new(
        target: ResourceRef,
        feedback: impl Into<String>,
        rating: Option<i16>,
    ) -> Result<Self, ReviewValidationError> {
        let feedback = feedback.into();
        if feedback.trim().is_empty() {
            return Err(ReviewValidationError::EmptyFeedback);
        }
        if feedback.chars().count() > FEEDBACK_MAX {
            return Err(ReviewValidationError::FeedbackTooLong { max: FEEDBACK_MAX });
        }
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(ReviewValidationError::RatingOutOfRange);
            }
        }
        Ok(Self {
            target,
            feedback,
            rating,
        })
    }
}
