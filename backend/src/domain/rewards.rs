//! Fire-and-forget reward side effects.
//!
//! Token awards and badge grants run after a primary side effect has already
//! succeeded. Their failures are logged at `warn` and never surfaced to the
//! caller, and they do not roll the primary action back.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::ports::{BadgeRepository, TokenLedger};
use super::tokens::{TokenAction, TokenAward};
use super::user::UserId;

/// Awards tokens and grants badges as request side effects.
#[derive(Clone)]
pub struct RewardService {
    ledger: Arc<dyn TokenLedger>,
    badges: Arc<dyn BadgeRepository>,
}

impl RewardService {
    /// Build the service from its ports.
    pub fn new(ledger: Arc<dyn TokenLedger>, badges: Arc<dyn BadgeRepository>) -> Self {
        Self { ledger, badges }
    }

    /// Credit the fixed amount for `action`.
    ///
    /// Failures are logged and swallowed; the primary action has already
    /// succeeded by the time this runs.
    pub async fn award(&self, user: UserId, action: TokenAction, reference: Option<Uuid>) {
        let award = TokenAward::for_action(user, action, reference);
        if let Err(error) = self.ledger.award(&award).await {
            warn!(
                %error,
                user_id = %user,
                action = %action,
                "token award failed; balance is now behind the ledgered action"
            );
        }
    }

    /// Grant the badge identified by `code` at most once.
    ///
    /// Unknown codes and storage failures are logged and swallowed. Returns
    /// whether a new grant was recorded.
    pub async fn grant_badge_once(&self, user: UserId, code: &str) -> bool {
        let badge = match self.badges.find_by_code(code).await {
            Ok(Some(badge)) => badge,
            Ok(None) => {
                warn!(code, "badge grant skipped: code not in catalogue");
                return false;
            }
            Err(error) => {
                warn!(%error, code, "badge lookup failed");
                return false;
            }
        };
        match self.badges.grant_once(user, badge.id).await {
            Ok(granted) => granted,
            Err(error) => {
                warn!(%error, code, user_id = %user, "badge grant failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::badge;
    use crate::outbound::memory::{MemoryBadgeRepository, MemoryTokenLedger};
    use rstest::rstest;

    fn service() -> (RewardService, Arc<MemoryTokenLedger>, Arc<MemoryBadgeRepository>) {
        let ledger = Arc::new(MemoryTokenLedger::default());
        let badges = Arc::new(MemoryBadgeRepository::with_default_catalogue());
        let service = RewardService::new(ledger.clone(), badges.clone());
        (service, ledger, badges)
    }

    #[rstest]
    #[actix_web::test]
    async fn balance_after_n_awards_equals_sum() {
        let (service, ledger, _) = service();
        let user = UserId::random();

        service.award(user, TokenAction::ProjectCreated, None).await;
        service.award(user, TokenAction::FailureLogged, None).await;
        service.award(user, TokenAction::CommentPosted, None).await;

        let balance = ledger.balance(user).await.expect("balance");
        let expected = TokenAction::ProjectCreated.amount()
            + TokenAction::FailureLogged.amount()
            + TokenAction::CommentPosted.amount();
        assert_eq!(balance.balance, expected);
        assert_eq!(balance.total_earned, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn badge_grants_are_one_time() {
        let (service, _, badges) = service();
        let user = UserId::random();

        assert!(service.grant_badge_once(user, badge::MENTOR).await);
        assert!(!service.grant_badge_once(user, badge::MENTOR).await);

        let held = badges.badges_for_user(user).await.expect("badges");
        assert_eq!(held.len(), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_badge_codes_are_swallowed() {
        let (service, _, _) = service();
        assert!(!service.grant_badge_once(UserId::random(), "no-such-badge").await);
    }
}
