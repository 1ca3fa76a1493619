//! Refund eligibility and lifecycle transitions.
//!
//! ```text
//! pending ──request──▶ processing ──settle──▶ refund_success
//!                        ▲    │
//!                  retry │    └──fail──▶ refund_failed
//!                        └───────────────────┘
//! ```
//!
//! Every transition validates first and mutates second, so a rejected request
//! leaves the record exactly as it was.

use crate::domain::fees::{FeeSchedule, RefundSummary};
use crate::domain::record::{ExceptionRecord, RefundOverrides, RefundState};
use crate::domain::taxonomy::{
    ActionType, ErrorStatus, RefundBlockReason, RefundFailureReason,
};
use crate::error::{RefundError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Destination address type, as classified by the ingestion side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipientKind {
    /// Externally-owned account, controlled by a private key.
    #[default]
    Eoa,
    /// Smart contract or other address that cannot take a plain transfer.
    Contract,
}

/// Who is asking for the refund to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    Automatic,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub initiator: Initiator,
    /// Operator-confirmed parameters; only honoured on the manual route.
    pub overrides: Option<RefundOverrides>,
}

impl RefundRequest {
    pub fn automatic() -> Self {
        Self {
            initiator: Initiator::Automatic,
            overrides: None,
        }
    }

    pub fn operator(overrides: Option<RefundOverrides>) -> Self {
        Self {
            initiator: Initiator::Operator,
            overrides: overrides.filter(|o| !o.is_empty()),
        }
    }
}

/// Decides whether a refund for `record` can be attempted at all.
///
/// A non-EOA recipient blocks regardless of value. Otherwise the refund is
/// blocked when its net USD value is below the USD cost of the gas needed to
/// send it.
pub fn assess_block(
    record: &ExceptionRecord,
    recipient: RecipientKind,
    fees: &FeeSchedule,
) -> Option<RefundBlockReason> {
    if recipient == RecipientKind::Contract {
        return Some(RefundBlockReason::NonEoaRecipient);
    }

    let summary = fees.calculate_net_refund(Some(record));
    below_gas_cost(&summary, &record.currency, fees)
        .then_some(RefundBlockReason::InsufficientGasFee)
}

/// True when `summary` is not worth the gas needed to send it.
///
/// A refund value too large to price always covers the gas; a gas cost too
/// large to price is never covered.
fn below_gas_cost(summary: &RefundSummary, currency: &str, fees: &FeeSchedule) -> bool {
    if summary.net_amount.is_zero() {
        return true;
    }
    let refund_usd = fees.usd_value(summary.net_amount, currency);
    let gas_usd = fees.usd_value(summary.gas_fee_we_pay_amount, &summary.gas_fee_we_pay_token);
    match (refund_usd, gas_usd) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(refund), Some(gas)) => refund < gas,
    }
}

/// Records the block assessment on a pending record.
pub fn enter_pending(
    record: &mut ExceptionRecord,
    recipient: RecipientKind,
    fees: &FeeSchedule,
) -> Result<Option<RefundBlockReason>> {
    ensure_status(record, ErrorStatus::Pending, ErrorStatus::Pending)?;
    let block_reason = assess_block(record, recipient, fees);
    if record.refund_block_reason() != block_reason {
        record.set_state(RefundState::Pending { block_reason });
    }
    Ok(block_reason)
}

/// External remediation: the condition behind the block has been fixed.
pub fn resolve_block(record: &mut ExceptionRecord) -> Result<()> {
    match record.state() {
        RefundState::Pending {
            block_reason: Some(_),
        } => {
            record.set_state(RefundState::Pending { block_reason: None });
            Ok(())
        }
        RefundState::Pending { block_reason: None } => Err(RefundError::NotBlocked),
        other => Err(RefundError::InvalidTransition {
            from: other.status(),
            to: ErrorStatus::Pending,
        }),
    }
}

/// `pending | refund_failed → processing`.
///
/// Returns the figures the refund is sent with. The value check of
/// [`assess_block`] is repeated against those figures, so a refund whose net
/// value does not cover its gas is rejected even if no block was recorded.
/// Operator overrides of network or fee take part in that check.
pub fn request_refund(
    record: &mut ExceptionRecord,
    request: RefundRequest,
    fees: &FeeSchedule,
    now: DateTime<Utc>,
) -> Result<RefundSummary> {
    match record.state() {
        RefundState::Pending {
            block_reason: Some(reason),
        } => return Err(RefundError::RefundBlocked(reason)),
        RefundState::Pending { block_reason: None } | RefundState::RefundFailed { .. } => {}
        other => {
            return Err(RefundError::InvalidTransition {
                from: other.status(),
                to: ErrorStatus::Processing,
            });
        }
    }

    let action = record.action();
    if request.initiator == Initiator::Automatic && action != ActionType::AutomaticRefund {
        return Err(RefundError::RouteNotPermitted { action });
    }
    if request.overrides.is_some() && action != ActionType::ManualRefund {
        return Err(RefundError::OverridesNotAllowed);
    }
    if let Some(fee) = request.overrides.as_ref().and_then(|o| o.service_fee_amount)
        && fee < Decimal::ZERO
    {
        return Err(RefundError::ValidationError(
            "Service fee override must not be negative".to_string(),
        ));
    }

    if record.refund_attempts().checked_add(1).is_none() {
        return Err(RefundError::ValidationError(format!(
            "Record {} has exhausted its refund attempt counter",
            record.id
        )));
    }

    let quote = fees.quote_with_overrides(record, request.overrides.as_ref())?;
    if below_gas_cost(&quote, &record.currency, fees) {
        return Err(RefundError::RefundBlocked(RefundBlockReason::InsufficientGasFee));
    }
    record.record_attempt(now, request.overrides);
    Ok(quote)
}

/// `processing → refund_success`, on confirmed on-chain settlement.
pub fn confirm_settlement(record: &mut ExceptionRecord) -> Result<()> {
    ensure_status(record, ErrorStatus::Processing, ErrorStatus::RefundSuccess)?;
    record.set_state(RefundState::RefundSuccess);
    Ok(())
}

/// `processing → refund_failed`, keeping attempt history for audit.
pub fn report_failure(record: &mut ExceptionRecord, reason: RefundFailureReason) -> Result<()> {
    ensure_status(record, ErrorStatus::Processing, ErrorStatus::RefundFailed)?;
    record.set_state(RefundState::RefundFailed {
        failure_reason: Some(reason),
    });
    Ok(())
}

fn ensure_status(record: &ExceptionRecord, expected: ErrorStatus, to: ErrorStatus) -> Result<()> {
    let from = record.status();
    if from == expected {
        Ok(())
    } else {
        Err(RefundError::InvalidTransition { from, to })
    }
}
