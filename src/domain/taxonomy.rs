//! Closed enumerations describing payment exceptions and their refund lifecycle.
//!
//! Every enumeration carries its wire tag, a human label and, where one exists,
//! a fixed explanatory string. Parsing an unknown tag fails with
//! [`RefundError::UnknownEnumerationValue`].

use crate::error::{RefundError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed service fee, in USD, charged on every refund regardless of currency.
pub const FIXED_SERVICE_FEE: Decimal = dec!(2);

/// Metadata shared by every taxonomy enumeration.
pub trait Taxon: Copy + Sized + 'static {
    /// Name used in error messages.
    const KIND: &'static str;
    /// Every value of the enumeration, in declaration order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn description(&self) -> &'static str;

    fn parse_tag(value: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.as_str() == value)
            .ok_or_else(|| RefundError::UnknownEnumerationValue {
                kind: Self::KIND,
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Overpayment,
    Underpayment,
    Timeout,
    WrongToken,
    UnmatchedOrder,
    UnsupportedWalletAddress,
}

impl Taxon for ErrorCategory {
    const KIND: &'static str = "error category";
    const ALL: &'static [Self] = &[
        Self::Overpayment,
        Self::Underpayment,
        Self::Timeout,
        Self::WrongToken,
        Self::UnmatchedOrder,
        Self::UnsupportedWalletAddress,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Overpayment => "overpayment",
            Self::Underpayment => "underpayment",
            Self::Timeout => "timeout",
            Self::WrongToken => "wrong_token",
            Self::UnmatchedOrder => "unmatched_order",
            Self::UnsupportedWalletAddress => "unsupported_wallet_address",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Overpayment => "Overpayment",
            Self::Underpayment => "Underpayment",
            Self::Timeout => "Payment Timeout",
            Self::WrongToken => "Wrong Token",
            Self::UnmatchedOrder => "Unmatched Order",
            Self::UnsupportedWalletAddress => "Unsupported Wallet Address",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Overpayment => "Payment amount exceeds expected order amount",
            Self::Underpayment => "Payment amount is less than expected order amount",
            Self::Timeout => "Transaction processing timeout",
            Self::WrongToken => "User sent incorrect token",
            Self::UnmatchedOrder => "Transaction does not match expected order details",
            Self::UnsupportedWalletAddress => "Wallet address type is not supported for refund",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    Pending,
    Processing,
    RefundSuccess,
    RefundFailed,
}

impl ErrorStatus {
    /// Position used when ordering records by status.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::RefundFailed => 2,
            Self::RefundSuccess => 3,
        }
    }
}

impl Taxon for ErrorStatus {
    const KIND: &'static str = "error status";
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Processing,
        Self::RefundSuccess,
        Self::RefundFailed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::RefundSuccess => "refund_success",
            Self::RefundFailed => "refund_failed",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Cannot Initiate Refund",
            Self::Processing => "Processing Refund",
            Self::RefundSuccess => "Refund Success",
            Self::RefundFailed => "Refund Failed",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Pending => "Pending refunds",
            Self::Processing => "Refund transaction submitted and awaiting settlement",
            Self::RefundSuccess => "Refund settled on chain",
            Self::RefundFailed => "Failed refunds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AutomaticRefund,
    ManualRefund,
}

impl Taxon for ActionType {
    const KIND: &'static str = "action type";
    const ALL: &'static [Self] = &[Self::AutomaticRefund, Self::ManualRefund];

    fn as_str(&self) -> &'static str {
        match self {
            Self::AutomaticRefund => "automatic_refund",
            Self::ManualRefund => "manual_refund",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::AutomaticRefund => "Automatic Refund",
            Self::ManualRefund => "Manual Refund",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::AutomaticRefund => "Automatically initiated refund process",
            Self::ManualRefund => "Human review and manual intervention required",
        }
    }
}

/// Why a refund cannot even be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundBlockReason {
    InsufficientGasFee,
    NonEoaRecipient,
}

impl Taxon for RefundBlockReason {
    const KIND: &'static str = "refund block reason";
    const ALL: &'static [Self] = &[Self::InsufficientGasFee, Self::NonEoaRecipient];

    fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientGasFee => "insufficient_gas_fee",
            Self::NonEoaRecipient => "non_eoa_recipient",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::InsufficientGasFee => "Insufficient Gas Fee",
            Self::NonEoaRecipient => "Non-EOA Recipient",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::InsufficientGasFee => {
                "Cannot initiate refund: Refund amount is less than gas fee required"
            }
            Self::NonEoaRecipient => {
                "Cannot initiate refund: Recipient wallet address is not EOA type"
            }
        }
    }
}

/// Why an attempted refund did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundFailureReason {
    InsufficientBalance,
    TransactionReverted,
    NetworkError,
    InvalidRecipient,
    InsufficientGasFee,
}

impl Taxon for RefundFailureReason {
    const KIND: &'static str = "refund failure reason";
    const ALL: &'static [Self] = &[
        Self::InsufficientBalance,
        Self::TransactionReverted,
        Self::NetworkError,
        Self::InvalidRecipient,
        Self::InsufficientGasFee,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => "insufficient_balance",
            Self::TransactionReverted => "transaction_reverted",
            Self::NetworkError => "network_error",
            Self::InvalidRecipient => "invalid_recipient",
            Self::InsufficientGasFee => "insufficient_gas_fee",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => "Insufficient Balance",
            Self::TransactionReverted => "Transaction Reverted",
            Self::NetworkError => "Network Error",
            Self::InvalidRecipient => "Invalid Recipient",
            Self::InsufficientGasFee => "Insufficient Gas Fee",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => {
                "Refund failed: Insufficient balance in contract to complete refund"
            }
            Self::TransactionReverted => "Refund failed: Transaction was reverted on blockchain",
            Self::NetworkError => "Refund failed: Network error during transaction processing",
            Self::InvalidRecipient => "Refund failed: Invalid recipient wallet address",
            Self::InsufficientGasFee => {
                "Refund failed: Insufficient gas fee provided for transaction"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFeePaidBy {
    User,
    Merchant,
}

impl Taxon for ServiceFeePaidBy {
    const KIND: &'static str = "service fee payer";
    const ALL: &'static [Self] = &[Self::User, Self::Merchant];

    fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Merchant => "merchant",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::User => "Paid by user",
            Self::Merchant => "Paid by merchant",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::User => "The service fee is deducted from the user's refund",
            Self::Merchant => "The service fee is charged to the merchant",
        }
    }
}

impl FromStr for ErrorCategory {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl FromStr for ErrorStatus {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl FromStr for ActionType {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl FromStr for RefundBlockReason {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl FromStr for RefundFailureReason {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl FromStr for ServiceFeePaidBy {
    type Err = RefundError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tag(s)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RefundBlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RefundFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ServiceFeePaidBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
