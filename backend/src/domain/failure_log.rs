//! Failure logs: records of attempted work, what went wrong, and lessons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::project::ProjectId;
use super::user::UserId;

/// Maximum allowed length for a failure log title.
pub const TITLE_MAX: usize = 120;
/// Maximum allowed length for narrative fields.
pub const NARRATIVE_MAX: usize = 8000;

/// Validation errors for failure log fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureLogValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("{field} must not be empty")]
    EmptyNarrative { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    NarrativeTooLong { field: &'static str, max: usize },
    #[error("unknown visibility: {value}")]
    UnknownVisibility { value: String },
}

/// Stable failure log identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureLogId(pub Uuid);

impl FailureLogId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for FailureLogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who may read a failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Database representation of the visibility.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse a stored visibility value.
    pub fn parse(value: &str) -> Result<Self, FailureLogValidationError> {
        match value {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(FailureLogValidationError::UnknownVisibility {
                value: other.to_owned(),
            }),
        }
    }
}

/// A user-authored failure record, optionally linked to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureLog {
    #[schema(value_type = String)]
    pub id: FailureLogId,
    #[schema(value_type = String)]
    pub owner_id: UserId,
    #[schema(value_type = Option<String>)]
    pub project_id: Option<ProjectId>,
    pub title: String,
    /// What was attempted and what went wrong.
    pub what_happened: String,
    /// What the author learned from the failure.
    pub lessons_learned: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FailureLog {
    /// Whether `viewer` may read this log.
    ///
    /// Public logs are readable by anyone, including unauthenticated
    /// callers. Private logs are readable only by their owner; admin access
    /// is decided by the caller before this check.
    pub fn visible_to(&self, viewer: Option<UserId>) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private => viewer == Some(self.owner_id),
        }
    }
}

/// Validated input for creating a failure log.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureLogDraft {
    pub project_id: Option<ProjectId>,
    pub title: String,
    pub what_happened: String,
    pub lessons_learned: String,
    pub visibility: Visibility,
}

impl FailureLogDraft {
    /// Validate field lengths and required narratives.
    pub fn new(
        project_id: Option<ProjectId>,
        title: impl Into<String>,
        what_happened: impl Into<String>,
        lessons_learned: impl Into<String>,
        visibility: Visibility,
    ) -> Result<Self, FailureLogValidationError> {
        let title = title.into();
        let what_happened = what_happened.into();
        let lessons_learned = lessons_learned.into();
        if title.trim().is_empty() {
            return Err(FailureLogValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(FailureLogValidationError::TitleTooLong { max: TITLE_MAX });
        }
        validate_narrative("whatHappened", &what_happened)?;
        validate_narrative("lessonsLearned", &lessons_learned)?;
        Ok(Self {
            project_id,
            title,
            what_happened,
            lessons_learned,
            visibility,
        })
    }
}

/// Partial update applied to an owned failure log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureLogPatch {
    pub title: Option<String>,
    pub what_happened: Option<String>,
    pub lessons_learned: Option<String>,
    pub visibility: Option<Visibility>,
}

impl FailureLogPatch {
    /// Validate whichever fields are present.
    pub fn validated(self) -> Result<Self, FailureLogValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(FailureLogValidationError::EmptyTitle);
            }
            if title.chars().count() > TITLE_MAX {
                return Err(FailureLogValidationError::TitleTooLong { max: TITLE_MAX });
            }
        }
        if let Some(text) = &self.what_happened {
            validate_narrative("whatHappened", text)?;
        }
        if let Some(text) = &self.lessons_learned {
            validate_narrative("lessonsLearned", text)?;
        }
        Ok(self)
    }
}

fn validate_narrative(field: &'static str, text: &str) -> Result<(), FailureLogValidationError> {
    if text.trim().is_empty() {
        return Err(FailureLogValidationError::EmptyNarrative { field });
    }
    if text.chars().count() > NARRATIVE_MAX {
        return Err(FailureLogValidationError::NarrativeTooLong {
            field,
            max: NARRATIVE_MAX,
        });
    }
    Ok(())
}
