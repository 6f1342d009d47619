//! Domain entities, invariants, and ports.
//!
//! Types here are transport agnostic: inbound adapters translate them to and
//! from HTTP, outbound adapters to and from storage rows. Validation happens
//! at construction; a value that exists satisfies its invariants.

pub mod badge;
pub mod comment;
pub mod error;
pub mod failure_log;
pub mod mentor;
pub mod mentor_service;
pub mod ports;
pub mod project;
pub mod review;
pub mod rewards;
pub mod slug;
pub mod tokens;
pub mod user;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::mentor_service::MentorService;
pub use self::rewards::RewardService;
pub use self::user::{Role, User, UserId, Username};
