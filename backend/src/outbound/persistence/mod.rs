//! Diesel/PostgreSQL adapters for the domain's persistence ports.
//!
//! Each repository owns a clone of the shared [`pool::DbPool`] and translates
//! Diesel errors through [`error_mapping`] into domain persistence errors.

mod diesel_badge_repository;
mod diesel_comment_repository;
mod diesel_failure_log_repository;
mod diesel_mentor_application_repository;
mod diesel_project_repository;
mod diesel_review_repository;
mod diesel_token_ledger;
mod diesel_users_repository;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_badge_repository::DieselBadgeRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_failure_log_repository::DieselFailureLogRepository;
pub use diesel_mentor_application_repository::DieselMentorApplicationRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_token_ledger::DieselTokenLedger;
pub use diesel_users_repository::DieselUsersRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
