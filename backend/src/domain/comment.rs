//! Comments on projects and failure logs.
//!
//! Replies nest a single level: a reply's parent must itself be a top-level
//! comment. "Helpful" marks are restricted to the owner of the commented
//! resource, at most one mark per `(user, comment)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::failure_log::FailureLogId;
use super::project::ProjectId;
use super::user::UserId;

/// Maximum allowed length for a comment body.
pub const BODY_MAX: usize = 4000;

/// Validation errors for comment fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    #[error("comment body must not be empty")]
    EmptyBody,
    #[error("comment body must be at most {max} characters")]
    BodyTooLong { max: usize },
    #[error("replies to replies are not allowed")]
    NestedReply,
}

/// Stable comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub Uuid);

impl CommentId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource a comment (or mentor review) is attached to.
///
/// The serialised `kind` matches the stored discriminant (`project` or
/// `failure_log`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ResourceRef {
    /// A project, by id.
    #[schema(value_type = String)]
    Project(ProjectId),
    /// A failure log, by id.
    #[schema(value_type = String)]
    FailureLog(FailureLogId),
}

impl ResourceRef {
    /// Database discriminant for the target kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "project",
            Self::FailureLog(_) => "failure_log",
        }
    }

    /// Raw UUID of the target resource.
    pub fn target_uuid(&self) -> Uuid {
        match self {
            Self::Project(id) => id.0,
            Self::FailureLog(id) => id.0,
        }
    }

    /// Reassemble a reference from its stored parts.
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "project" => Some(Self::Project(ProjectId(id))),
            "failure_log" => Some(Self::FailureLog(FailureLogId(id))),
            _ => None,
        }
    }
}

/// A comment on a project or failure log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[schema(value_type = String)]
    pub id: CommentId,
    #[schema(value_type = String)]
    pub author_id: UserId,
    pub target: ResourceRef,
    /// Present on replies; the referenced comment is always top-level.
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<CommentId>,
    pub body: String,
    /// Number of helpful marks received.
    pub helpful_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Guard for the single-level nesting invariant: replying to `self` is
    /// only allowed when `self` is itself top-level.
    pub fn accepts_replies(&self) -> Result<(), CommentValidationError> {
        if self.parent_id.is_some() {
            return Err(CommentValidationError::NestedReply);
        }
        Ok(())
    }
}

/// Validated input for posting a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub target: ResourceRef,
    pub parent_id: Option<CommentId>,
    pub body: String,
}

impl CommentDraft {
    /// Validate the comment body.
    pub fn new(
        target: ResourceRef,
        parent_id: Option<CommentId>,
        body: impl Into<String>,
    ) -> Result<Self, CommentValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        if body.chars().count() > BODY_MAX {
            return Err(CommentValidationError::BodyTooLong { max: BODY_MAX });
        }
        Ok(Self {
            target,
            parent_id,
            body,
        })
    }
}
