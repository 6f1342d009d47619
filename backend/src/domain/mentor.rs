//! Mentor applications and their approval state machine.
//!
//! States: `none → pending → {approved, rejected}`, with `rejected →
//! pending` on resubmission. At most one application row exists per user;
//! submission is an upsert that replaces a rejected row in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Maximum allowed length for application free-text fields.
pub const TEXT_MAX: usize = 4000;

/// Validation errors for application fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("unknown application status: {value}")]
    UnknownStatus { value: String },
}

/// Stable application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of a mentor application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Database representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a stored status value.
    pub fn parse(value: &str) -> Result<Self, ApplicationValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ApplicationValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }

    /// Whether a user in this state may submit a (new) application.
    ///
    /// A pending or approved application blocks resubmission; a rejected one
    /// may be replaced.
    pub fn allows_resubmission(self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Whether an admin may decide this application.
    pub fn is_decidable(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's application for the mentor role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MentorApplication {
    #[schema(value_type = String)]
    pub id: ApplicationId,
    #[schema(value_type = String)]
    pub applicant_id: UserId,
    /// Why the applicant wants to mentor.
    pub motivation: String,
    /// Areas the applicant can mentor in.
    pub expertise: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Validated input for submitting an application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub motivation: String,
    pub expertise: String,
}

impl ApplicationDraft {
    /// Validate motivation and expertise text.
    pub fn new(
        motivation: impl Into<String>,
        expertise: impl Into<String>,
    ) -> Result<Self, ApplicationValidationError> {
        let motivation = motivation.into();
        let expertise = expertise.into();
        validate_text("motivation", &motivation)?;
        validate_text("expertise", &expertise)?;
        Ok(Self {
            motivation,
            expertise,
        })
    }
}

fn validate_text(field: &'static str, text: &str) -> Result<(), ApplicationValidationError> {
    if text.trim().is_empty() {
        return Err(ApplicationValidationError::EmptyField { field });
    }
    if text.chars().count() > TEXT_MAX {
        return Err(ApplicationValidationError::FieldTooLong {
            field,
            max: TEXT_MAX,
        });
    }
    Ok(())
}
