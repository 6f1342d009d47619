//! Badge catalogue and one-time grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Badge granted for a user's first failure log.
pub const FIRST_FAILURE_LOG: &str = "first-failure-log";
/// Badge granted on mentor application approval.
pub const MENTOR: &str = "mentor";

/// A badge definition from the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Stable slug-style code, e.g. `first-failure-log`.
    pub code: String,
    pub name: String,
    pub description: String,
}

/// A one-time badge grant recorded in the join table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub badge: Badge,
    pub granted_at: DateTime<Utc>,
}

/// Badges seeded into a fresh store.
pub fn default_catalogue() -> Vec<Badge> {
    vec![
        Badge {
            id: Uuid::new_v4(),
            code: FIRST_FAILURE_LOG.to_owned(),
            name: "First Failure Log".to_owned(),
            description: "Documented a failure for the first time.".to_owned(),
        },
        Badge {
            id: Uuid::new_v4(),
            code: MENTOR.to_owned(),
            name: "Mentor".to_owned(),
            description: "Approved as a platform mentor.".to_owned(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_contains_workflow_badges() {
        let codes: Vec<_> = default_catalogue().into_iter().map(|b| b.code).collect();
        assert!(codes.contains(&FIRST_FAILURE_LOG.to_owned()));
        assert!(codes.contains(&MENTOR.to_owned()));
    }
}
