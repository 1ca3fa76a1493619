//! Application layer orchestrating the refund engine over its ports.
//!
//! [`engine::RefundEngine`] is the single entry point for collaborators: it
//! loads records from the repository, applies domain transitions and writes
//! the results back.

pub mod engine;
