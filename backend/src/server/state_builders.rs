//! Builders selecting database-backed or in-memory port implementations.

use std::sync::Arc;

use actix_web::web;

use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{
    DbPool, DieselBadgeRepository, DieselCommentRepository, DieselFailureLogRepository,
    DieselMentorApplicationRepository, DieselProjectRepository, DieselReviewRepository,
    DieselTokenLedger, DieselUsersRepository,
};

use super::ServerConfig;

fn database_ports(pool: &DbPool) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUsersRepository::new(pool.clone())),
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
        failure_logs: Arc::new(DieselFailureLogRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        applications: Arc::new(DieselMentorApplicationRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        ledger: Arc::new(DieselTokenLedger::new(pool.clone())),
        badges: Arc::new(DieselBadgeRepository::new(pool.clone())),
    }
}

/// Build the shared HTTP state, database-backed when a pool is configured and
/// in-memory otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => HttpState::new(database_ports(pool)),
        None => HttpState::memory(),
    };
    web::Data::new(state)
}
