use crate::domain::taxonomy::{ActionType, ErrorStatus, RefundBlockReason};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefundError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Unknown {kind} value: '{value}'")]
    UnknownEnumerationValue { kind: &'static str, value: String },
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: ErrorStatus, to: ErrorStatus },
    #[error("Refund blocked: {0}")]
    RefundBlocked(RefundBlockReason),
    #[error("Automatic refund not permitted on the {action} route")]
    RouteNotPermitted { action: ActionType },
    #[error("Refund overrides are only accepted on the manual refund route")]
    OverridesNotAllowed,
    #[error("Record has no refund block to resolve")]
    NotBlocked,
    #[error("Exception record not found: {0}")]
    RecordNotFound(String),
    #[error("Duplicate exception record: {0}")]
    DuplicateRecord(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, RefundError>;
