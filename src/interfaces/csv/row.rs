use crate::domain::record::{ExceptionRecord, NewException, ObservedGasFee, RefundState};
use crate::domain::taxonomy::Taxon;
use crate::error::{RefundError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Flat CSV shape of an [`ExceptionRecord`].
///
/// Enumeration columns stay as text here so that unknown tags surface as
/// [`RefundError::UnknownEnumerationValue`] during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
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
    pub category: String,
    pub status: String,
    pub action: String,
    pub error_message: String,
    pub gas_fee: Option<Decimal>,
    pub gas_fee_token: Option<String>,
    pub service_fee_paid_by: Option<String>,
    pub refund_attempts: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub refund_block_reason: Option<String>,
    pub refund_failure_reason: Option<String>,
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = RefundError>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse())
        .transpose()
}

impl TryFrom<RecordRow> for ExceptionRecord {
    type Error = RefundError;

    fn try_from(row: RecordRow) -> Result<Self> {
        let state = RefundState::from_parts(
            row.status.parse()?,
            parse_optional(row.refund_block_reason)?,
            parse_optional(row.refund_failure_reason)?,
        )?;

        let new = NewException {
            id: row.id,
            payment_order_id: row.payment_order_id,
            payment_order_amount: row.payment_order_amount,
            payment_order_currency: row.payment_order_currency,
            transaction_hash: row.transaction_hash,
            timestamp: row.timestamp,
            amount: row.amount,
            currency: row.currency,
            from_address: row.from_address,
            to_address: row.to_address,
            blockchain_network: row.blockchain_network,
            category: row.category.parse()?,
            action: row.action.parse()?,
            error_message: row.error_message,
            gas_fee: row.gas_fee.map(|amount| ObservedGasFee {
                amount,
                token: row.gas_fee_token.filter(|t| !t.is_empty()),
            }),
            service_fee_paid_by: parse_optional(row.service_fee_paid_by)?,
        };

        ExceptionRecord::restore(new, state, row.refund_attempts, row.last_attempt)
    }
}

impl From<&ExceptionRecord> for RecordRow {
    fn from(record: &ExceptionRecord) -> Self {
        Self {
            id: record.id.clone(),
            payment_order_id: record.payment_order_id.clone(),
            payment_order_amount: record.payment_order_amount,
            payment_order_currency: record.payment_order_currency.clone(),
            transaction_hash: record.transaction_hash.clone(),
            timestamp: record.timestamp,
            amount: record.amount,
            currency: record.currency.clone(),
            from_address: record.from_address.clone(),
            to_address: record.to_address.clone(),
            blockchain_network: record.blockchain_network.clone(),
            category: record.category().as_str().to_string(),
            status: record.status().as_str().to_string(),
            action: record.action().as_str().to_string(),
            error_message: record.error_message.clone(),
            gas_fee: record.gas_fee.as_ref().map(|gas| gas.amount),
            gas_fee_token: record.gas_fee.as_ref().and_then(|gas| gas.token.clone()),
            service_fee_paid_by: record.service_fee_paid_by.map(|p| p.as_str().to_string()),
            refund_attempts: record.refund_attempts(),
            last_attempt: record.last_attempt(),
            refund_block_reason: record.refund_block_reason().map(|r| r.as_str().to_string()),
            refund_failure_reason: record
                .refund_failure_reason()
                .map(|r| r.as_str().to_string()),
        }
    }
}
