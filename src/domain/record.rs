use crate::domain::taxonomy::{
    ActionType, ErrorCategory, ErrorStatus, RefundBlockReason, RefundFailureReason,
    ServiceFeePaidBy,
};
use crate::error::{RefundError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Refund lifecycle state with the reason that is only meaningful in that state.
///
/// A block reason can only exist while pending and a failure reason only after
/// a failed attempt, so the two can never be set together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefundState {
    Pending {
        block_reason: Option<RefundBlockReason>,
    },
    Processing,
    RefundSuccess,
    RefundFailed {
        failure_reason: Option<RefundFailureReason>,
    },
}

impl RefundState {
    pub fn status(&self) -> ErrorStatus {
        match self {
            Self::Pending { .. } => ErrorStatus::Pending,
            Self::Processing => ErrorStatus::Processing,
            Self::RefundSuccess => ErrorStatus::RefundSuccess,
            Self::RefundFailed { .. } => ErrorStatus::RefundFailed,
        }
    }

    pub fn block_reason(&self) -> Option<RefundBlockReason> {
        match self {
            Self::Pending { block_reason } => *block_reason,
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<RefundFailureReason> {
        match self {
            Self::RefundFailed { failure_reason } => *failure_reason,
            _ => None,
        }
    }

    /// Rebuilds a state from its flat representation, rejecting reasons that
    /// do not belong to the given status.
    pub fn from_parts(
        status: ErrorStatus,
        block_reason: Option<RefundBlockReason>,
        failure_reason: Option<RefundFailureReason>,
    ) -> Result<Self> {
        match (status, block_reason, failure_reason) {
            (ErrorStatus::Pending, block_reason, None) => Ok(Self::Pending { block_reason }),
            (ErrorStatus::Processing, None, None) => Ok(Self::Processing),
            (ErrorStatus::RefundSuccess, None, None) => Ok(Self::RefundSuccess),
            (ErrorStatus::RefundFailed, None, failure_reason) => {
                Ok(Self::RefundFailed { failure_reason })
            }
            (status, block, failure) => Err(RefundError::ValidationError(format!(
                "status {status} cannot carry block reason {:?} and failure reason {:?}",
                block.map(|r| r.to_string()),
                failure.map(|r| r.to_string()),
            ))),
        }
    }
}

impl Default for RefundState {
    fn default() -> Self {
        Self::Pending { block_reason: None }
    }
}

/// Gas cost observed on the original failed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedGasFee {
    pub amount: Decimal,
    pub token: Option<String>,
}

/// Parameters an operator confirmed for the latest refund attempt on the manual route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundOverrides {
    pub wallet_address: Option<String>,
    pub network: Option<String>,
    pub service_fee_amount: Option<Decimal>,
    pub service_fee_currency: Option<String>,
}

impl RefundOverrides {
    pub fn is_empty(&self) -> bool {
        self.wallet_address.is_none()
            && self.network.is_none()
            && self.service_fee_amount.is_none()
            && self.service_fee_currency.is_none()
    }
}

/// Everything the ingestion side knows when an anomaly is first detected.
#[derive(Debug, Clone, PartialEq)]
pub struct NewException {
    pub id: String,
    pub payment_order_id: String,
    pub payment_order_amount: Decimal,
    pub payment_order_currency: String,
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
    pub from_address: String,
    pub to_address: String,
    pub blockchain_network: String,
    pub category: ErrorCategory,
    pub action: ActionType,
    pub error_message: String,
    pub gas_fee: Option<ObservedGasFee>,
    pub service_fee_paid_by: Option<ServiceFeePaidBy>,
}

/// A detected mismatch between an expected payment order and the payment observed on chain.
///
/// Identity, classification and observed payment data are fixed at creation.
/// Refund bookkeeping is only changed through the transitions in
/// [`crate::domain::refund`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    pub id: String,
    pub payment_order_id: String,
    pub payment_order_amount: Decimal,
    pub payment_order_currency: String,
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
    pub from_address: String,
    pub to_address: String,
    pub blockchain_network: String,
    pub error_message: String,
    pub gas_fee: Option<ObservedGasFee>,
    pub service_fee_paid_by: Option<ServiceFeePaidBy>,
    category: ErrorCategory,
    action: ActionType,
    #[serde(flatten)]
    state: RefundState,
    refund_attempts: u32,
    last_attempt: Option<DateTime<Utc>>,
    confirmed_overrides: Option<RefundOverrides>,
    revision: u64,
}

impl ExceptionRecord {
    /// Creates a freshly detected record in the `pending` state.
    pub fn new(new: NewException) -> Result<Self> {
        Self::restore(new, RefundState::default(), 0, None)
    }

    /// Rebuilds a record with existing refund bookkeeping, e.g. when loading a snapshot.
    pub fn restore(
        new: NewException,
        state: RefundState,
        refund_attempts: u32,
        last_attempt: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if new.id.trim().is_empty() {
            return Err(RefundError::ValidationError(
                "Record id must not be empty".to_string(),
            ));
        }
        if new.amount < Decimal::ZERO || new.payment_order_amount < Decimal::ZERO {
            return Err(RefundError::ValidationError(format!(
                "Record {} has a negative amount",
                new.id
            )));
        }
        if new.gas_fee.as_ref().is_some_and(|gas| gas.amount < Decimal::ZERO) {
            return Err(RefundError::ValidationError(format!(
                "Record {} has a negative gas fee",
                new.id
            )));
        }
        if refund_attempts == 0 && last_attempt.is_some() {
            return Err(RefundError::ValidationError(format!(
                "Record {} has a last attempt but no refund attempts",
                new.id
            )));
        }

        Ok(Self {
            id: new.id,
            payment_order_id: new.payment_order_id,
            payment_order_amount: new.payment_order_amount,
            payment_order_currency: new.payment_order_currency,
            transaction_hash: new.transaction_hash,
            timestamp: new.timestamp,
            amount: new.amount,
            currency: new.currency,
            from_address: new.from_address,
            to_address: new.to_address,
            blockchain_network: new.blockchain_network,
            error_message: new.error_message,
            gas_fee: new.gas_fee,
            service_fee_paid_by: new.service_fee_paid_by,
            category: new.category,
            action: new.action,
            state,
            refund_attempts,
            last_attempt,
            confirmed_overrides: None,
            revision: 0,
        })
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn action(&self) -> ActionType {
        self.action
    }

    pub fn state(&self) -> RefundState {
        self.state
    }

    pub fn status(&self) -> ErrorStatus {
        self.state.status()
    }

    pub fn refund_block_reason(&self) -> Option<RefundBlockReason> {
        self.state.block_reason()
    }

    pub fn refund_failure_reason(&self) -> Option<RefundFailureReason> {
        self.state.failure_reason()
    }

    pub fn refund_attempts(&self) -> u32 {
        self.refund_attempts
    }

    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.last_attempt
    }

    pub fn confirmed_overrides(&self) -> Option<&RefundOverrides> {
        self.confirmed_overrides.as_ref()
    }

    /// Bumped on every mutation; `(id, revision)` identifies a record snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_state(&mut self, state: RefundState) {
        self.state = state;
        self.revision += 1;
    }

    pub(crate) fn record_attempt(&mut self, at: DateTime<Utc>, overrides: Option<RefundOverrides>) {
        self.refund_attempts += 1;
        self.last_attempt = Some(at);
        self.confirmed_overrides = overrides;
        self.state = RefundState::Processing;
        self.revision += 1;
    }
}
