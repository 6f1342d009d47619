//! User identity, roles, and profile data.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("username must be 3-24 lowercase letters, digits, or hyphens")]
    InvalidUsername,
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    #[error("display name may only contain letters, numbers, spaces, or underscores")]
    DisplayNameInvalidCharacters,
    #[error("unknown role: {value}")]
    UnknownRole { value: String },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login handle: lowercase letters, digits, and hyphens, 3-24 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 24;

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length < USERNAME_MIN || length > USERNAME_MAX {
            return Err(UserValidationError::InvalidUsername);
        }
        let valid = value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !valid {
            return Err(UserValidationError::InvalidUsername);
        }
        Ok(Self(value))
    }

    /// Borrow the underlying handle.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 48;

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains allowed characters.
        Regex::new("^[A-Za-z0-9_ ]+$")
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if value.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name_regex().is_match(&value) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Platform role. Mutated only by the admin approval path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Mentor,
    SeniorMentor,
    Admin,
}

impl Role {
    /// Database representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
            Self::SeniorMentor => "senior_mentor",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored role value.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "student" => Ok(Self::Student),
            "mentor" => Ok(Self::Mentor),
            "senior_mentor" => Ok(Self::SeniorMentor),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }

    /// Whether the role may administer the platform.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may review student work.
    pub fn can_review(self) -> bool {
        matches!(self, Self::Mentor | Self::SeniorMentor | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Unique login handle.
    #[schema(value_type = String, example = "ada-lovelace")]
    pub username: Username,
    /// Name shown to other users.
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub display_name: DisplayName,
    /// Platform role.
    pub role: Role,
    /// Platform verification granted on mentor approval.
    pub verified: bool,
    /// Account creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada-lovelace", true)]
    #[case("ab", false)]
    #[case("Ada", false)]
    #[case("with space", false)]
    #[case("a-very-long-username-over-limit", false)]
    fn username_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Username::new(raw).is_ok(), ok, "username {raw:?}");
    }

    #[rstest]
    #[case("Ada Lovelace", true)]
    #[case("   ", false)]
    #[case("name-with-hyphen", false)]
    fn display_name_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(DisplayName::new(raw).is_ok(), ok, "display name {raw:?}");
    }

    #[rstest]
    #[case(Role::Student, false, false)]
    #[case(Role::Mentor, false, true)]
    #[case(Role::SeniorMentor, false, true)]
    #[case(Role::Admin, true, true)]
    fn role_capabilities(#[case] role: Role, #[case] admin: bool, #[case] review: bool) {
        assert_eq!(role.is_admin(), admin);
        assert_eq!(role.can_review(), review);
    }

    #[rstest]
    fn role_round_trips_through_storage_form() {
        for role in [Role::Student, Role::Mentor, Role::SeniorMentor, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Ok(role));
        }
        assert!(Role::parse("superuser").is_err());
    }
}
