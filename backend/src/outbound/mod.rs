//! Driven adapters implementing the domain's outbound ports.
//!
//! `persistence` holds the Diesel/PostgreSQL repositories; `memory` holds
//! in-process equivalents used by tests and by runs without a database.

pub mod memory;
pub mod password;
pub mod persistence;
