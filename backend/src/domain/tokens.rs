//! Token (reputation) accounting.
//!
//! Tokens are awarded for qualifying platform actions with fixed per-action
//! amounts. Accounts track a spendable `balance` and a monotonic
//! `total_earned`; the ledger is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Qualifying actions that earn tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenAction {
    ProjectCreated,
    FailureLogged,
    CommentPosted,
    MentorReview,
    ApplicationApproved,
}

impl TokenAction {
    /// Fixed award amount for this action.
    pub fn amount(self) -> i64 {
        match self {
            Self::ProjectCreated => 10,
            Self::FailureLogged => 15,
            Self::CommentPosted => 2,
            Self::MentorReview => 20,
            Self::ApplicationApproved => 50,
        }
    }

    /// Database representation of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::FailureLogged => "failure_logged",
            Self::CommentPosted => "comment_posted",
            Self::MentorReview => "mentor_review",
            Self::ApplicationApproved => "application_approved",
        }
    }

    /// Parse a stored action value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project_created" => Some(Self::ProjectCreated),
            "failure_logged" => Some(Self::FailureLogged),
            "comment_posted" => Some(Self::CommentPosted),
            "mentor_review" => Some(Self::MentorReview),
            "application_approved" => Some(Self::ApplicationApproved),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single award request passed to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAward {
    pub user_id: UserId,
    pub action: TokenAction,
    pub amount: i64,
    /// Id of the resource that triggered the award, if any.
    pub reference: Option<Uuid>,
}

impl TokenAward {
    /// Build an award with the action's fixed amount.
    pub fn for_action(user_id: UserId, action: TokenAction, reference: Option<Uuid>) -> Self {
        Self {
            user_id,
            action,
            amount: action.amount(),
            reference,
        }
    }
}

/// A user's token account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub balance: i64,
    /// Lifetime tokens earned; never decreases.
    pub total_earned: i64,
}

impl TokenBalance {
    /// Empty account for a user with no awards yet.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: 0,
            total_earned: 0,
        }
    }
}

/// An append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub action: TokenAction,
    pub amount: i64,
    #[schema(value_type = Option<String>)]
    pub reference: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
