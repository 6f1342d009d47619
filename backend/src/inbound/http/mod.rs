//! HTTP inbound adapter exposing the REST API.

pub mod admin;
pub mod auth;
pub mod badges;
pub mod comments;
pub mod error;
pub mod failure_logs;
pub mod health;
pub mod mentor;
pub mod projects;
pub mod reviews;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tokens;
pub mod users;

pub use error::ApiResult;
