//! Project aggregate: a documented piece of student work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::slug::Slug;
use super::user::UserId;

/// Maximum allowed length for a project title.
pub const TITLE_MAX: usize = 120;
/// Maximum allowed length for a project summary.
pub const SUMMARY_MAX: usize = 4000;

/// Validation errors for project fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("summary must be at most {max} characters")]
    SummaryTooLong { max: usize },
    #[error("unknown project status: {value}")]
    UnknownStatus { value: String },
}

/// Stable project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl ProjectStatus {
    /// Database representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Abandoned => "ABANDONED",
        }
    }

    /// Parse a stored status value.
    pub fn parse(value: &str) -> Result<Self, ProjectValidationError> {
        match value {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "ABANDONED" => Ok(Self::Abandoned),
            other => Err(ProjectValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// A student project with a unique, title-derived slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[schema(value_type = String)]
    pub id: ProjectId,
    #[schema(value_type = String)]
    pub owner_id: UserId,
    pub title: String,
    pub summary: String,
    pub status: ProjectStatus,
    /// Unique, URL-safe identifier derived from the title.
    #[schema(value_type = String, example = "my-first-robot")]
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub summary: String,
}

impl ProjectDraft {
    /// Validate title and summary lengths.
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Result<Self, ProjectValidationError> {
        let title = title.into();
        let summary = summary.into();
        validate_title(&title)?;
        validate_summary(&summary)?;
        Ok(Self { title, summary })
    }
}

/// Partial update applied to an owned project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// Validate whichever fields are present.
    pub fn validated(self) -> Result<Self, ProjectValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(summary) = &self.summary {
            validate_summary(summary)?;
        }
        Ok(self)
    }

    /// Whether the patch changes anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.summary.is_none() && self.status.is_none()
    }
}

fn validate_title(title: &str) -> Result<(), ProjectValidationError> {
    if title.trim().is_empty() {
        return Err(ProjectValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ProjectValidationError::TitleTooLong { max: TITLE_MAX });
    }
    Ok(())
}

fn validate_summary(summary: &str) -> Result<(), ProjectValidationError> {
    if summary.chars().count() > SUMMARY_MAX {
        return Err(ProjectValidationError::SummaryTooLong { max: SUMMARY_MAX });
    }
    Ok(())
}
