//! Request middleware: tracing and request-scoped identifiers.

pub mod trace;

pub use trace::Trace;
