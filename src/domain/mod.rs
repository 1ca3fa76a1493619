//! Pure domain model: taxonomy, records, fee reconciliation and the refund
//! lifecycle. Nothing in this layer performs I/O.

pub mod fees;
pub mod ports;
pub mod query;
pub mod record;
pub mod refund;
pub mod taxonomy;
