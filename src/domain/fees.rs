//! Fee reconciliation: converts the fixed USD service fee into the refund
//! currency and reports the gas the operator pays to send the refund.
//!
//! Nothing in here fails. Unknown networks and tokens degrade to the schedule
//! defaults, and degenerate records produce a zeroed summary.

use crate::domain::record::{ExceptionRecord, RefundOverrides};
use crate::domain::taxonomy::FIXED_SERVICE_FEE;
use crate::error::{RefundError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Symbol reported when a network's native token is unknown.
pub const DEFAULT_GAS_TOKEN: &str = "TOKEN";

/// Gas cost of a refund transaction, in the network's native token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub fee: Decimal,
    pub token: String,
}

impl GasEstimate {
    pub fn new(fee: Decimal, token: impl Into<String>) -> Self {
        Self {
            fee,
            token: token.into(),
        }
    }
}

impl Default for GasEstimate {
    fn default() -> Self {
        Self::new(dec!(0.001), DEFAULT_GAS_TOKEN)
    }
}

/// Net figures for refunding one exception record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundSummary {
    /// Amount returned to the payer, in the record currency. Never negative.
    pub net_amount: Decimal,
    /// Service fee deducted, in the record currency.
    pub service_fee: Decimal,
    /// Gas the operator pays on top of the refund; never deducted from it.
    pub gas_fee_we_pay_amount: Decimal,
    pub gas_fee_we_pay_token: String,
}

impl RefundSummary {
    pub fn zeroed() -> Self {
        Self {
            net_amount: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            gas_fee_we_pay_amount: Decimal::ZERO,
            gas_fee_we_pay_token: DEFAULT_GAS_TOKEN.to_string(),
        }
    }
}

/// Static gas and price tables used for reconciliation.
///
/// Loaded once at startup. A top-level field that a JSON schedule omits keeps
/// its built-in value, but a table that is given replaces the built-in table
/// entirely; symbols missing from it use the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub service_fee_usd: Decimal,
    pub gas_estimates: HashMap<String, GasEstimate>,
    pub default_gas_estimate: GasEstimate,
    pub token_prices: HashMap<String, Decimal>,
    pub default_token_price: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        let gas_estimates = [
            ("Ethereum", dec!(0.008), "ETH"),
            ("Polygon", dec!(0.5), "MATIC"),
            ("Arbitrum One", dec!(0.0001), "ETH"),
            ("Optimism", dec!(0.0005), "ETH"),
            ("BSC", dec!(0.002), "BNB"),
        ]
        .into_iter()
        .map(|(network, fee, token)| (network.to_string(), GasEstimate::new(fee, token)))
        .collect();

        let token_prices = [
            ("ETH", dec!(2500)),
            ("MATIC", dec!(0.8)),
            ("BNB", dec!(600)),
            ("USDC", dec!(1)),
            ("USDT", dec!(1)),
            (DEFAULT_GAS_TOKEN, dec!(1)),
        ]
        .into_iter()
        .map(|(symbol, price)| (symbol.to_string(), price))
        .collect();

        Self {
            service_fee_usd: FIXED_SERVICE_FEE,
            gas_estimates,
            default_gas_estimate: GasEstimate::default(),
            token_prices,
            default_token_price: dec!(1),
        }
    }
}

impl FeeSchedule {
    /// Gas estimate for sending a refund on `network`.
    pub fn estimate_refund_gas_fee(&self, network: Option<&str>) -> GasEstimate {
        match network.filter(|n| !n.is_empty()) {
            Some(network) => match self.gas_estimates.get(network) {
                Some(estimate) => estimate.clone(),
                None => {
                    debug!(network, "no gas estimate for network, using default");
                    self.default_gas_estimate.clone()
                }
            },
            None => self.default_gas_estimate.clone(),
        }
    }

    /// USD price of one unit of `symbol`. Unknown or non-positive prices fall back to the default.
    pub fn token_price(&self, symbol: &str) -> Decimal {
        match self.token_prices.get(symbol) {
            Some(price) if *price > Decimal::ZERO => *price,
            _ => {
                debug!(symbol, "no usable price for token, using default");
                self.default_token_price
            }
        }
    }

    /// Converts `amount` of `from` into units of `to` through their USD prices.
    ///
    /// Returns `None` if the result does not fit in a `Decimal`.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        amount
            .checked_mul(self.token_price(from))?
            .checked_div(self.token_price(to))
    }

    /// USD value of `amount` units of `symbol`, or `None` on overflow.
    pub fn usd_value(&self, amount: Decimal, symbol: &str) -> Option<Decimal> {
        amount.checked_mul(self.token_price(symbol))
    }

    /// Fixed USD service fee expressed in `currency`.
    pub fn service_fee_in(&self, currency: &str) -> Decimal {
        self.service_fee_usd
            .checked_div(self.token_price(currency))
            .unwrap_or(self.service_fee_usd)
    }

    /// Net refund figures for `record`.
    ///
    /// A missing record, an empty currency or a zero amount yields
    /// [`RefundSummary::zeroed`].
    pub fn calculate_net_refund(&self, record: Option<&ExceptionRecord>) -> RefundSummary {
        let Some(record) = record else {
            return RefundSummary::zeroed();
        };
        if record.currency.is_empty() || record.amount.is_zero() {
            return RefundSummary::zeroed();
        }

        let gas = self.estimate_refund_gas_fee(Some(&record.blockchain_network));
        let service_fee = self.service_fee_in(&record.currency);

        RefundSummary {
            net_amount: (record.amount - service_fee).max(Decimal::ZERO),
            service_fee,
            gas_fee_we_pay_amount: gas.fee,
            gas_fee_we_pay_token: gas.token,
        }
    }

    /// Like [`FeeSchedule::calculate_net_refund`], with operator overrides applied.
    ///
    /// An overridden network changes the gas estimate. An overridden service fee
    /// is converted from its currency (the record currency if none is given)
    /// into the record currency. An override fee too large to convert is a
    /// [`RefundError::ValidationError`].
    pub fn quote_with_overrides(
        &self,
        record: &ExceptionRecord,
        overrides: Option<&RefundOverrides>,
    ) -> Result<RefundSummary> {
        let mut summary = self.calculate_net_refund(Some(record));
        let Some(overrides) = overrides else {
            return Ok(summary);
        };
        if record.currency.is_empty() || record.amount.is_zero() {
            return Ok(summary);
        }

        if let Some(network) = overrides.network.as_deref() {
            let gas = self.estimate_refund_gas_fee(Some(network));
            summary.gas_fee_we_pay_amount = gas.fee;
            summary.gas_fee_we_pay_token = gas.token;
        }
        if let Some(fee) = overrides.service_fee_amount {
            let fee_currency = overrides
                .service_fee_currency
                .as_deref()
                .unwrap_or(&record.currency);
            summary.service_fee = self
                .convert(fee.max(Decimal::ZERO), fee_currency, &record.currency)
                .ok_or_else(|| {
                    RefundError::ValidationError(format!(
                        "Service fee override {fee} {fee_currency} cannot be converted into {}",
                        record.currency
                    ))
                })?;
            summary.net_amount = (record.amount - summary.service_fee).max(Decimal::ZERO);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::tests::sample;
    use rust_decimal_macros::dec;

    fn record(amount: Decimal, currency: &str, network: &str) -> ExceptionRecord {
        let mut new = sample("fee");
        new.amount = amount;
        new.currency = currency.to_string();
        new.blockchain_network = network.to_string();
        ExceptionRecord::new(new).unwrap()
    }

    #[test]
    fn test_gas_estimate_known_networks() {
        let fees = FeeSchedule::default();
        assert_eq!(
            fees.estimate_refund_gas_fee(Some("Polygon")),
            GasEstimate::new(dec!(0.5), "MATIC")
        );
        assert_eq!(
            fees.estimate_refund_gas_fee(Some("Arbitrum One")),
            GasEstimate::new(dec!(0.0001), "ETH")
        );
        assert_eq!(
            fees.estimate_refund_gas_fee(Some("BSC")),
            GasEstimate::new(dec!(0.002), "BNB")
        );
    }

    #[test]
    fn test_gas_estimate_unknown_network_defaults() {
        let fees = FeeSchedule::default();
        let expected = GasEstimate::new(dec!(0.001), "TOKEN");
        assert_eq!(fees.estimate_refund_gas_fee(Some("Solana")), expected);
        assert_eq!(fees.estimate_refund_gas_fee(Some("")), expected);
        assert_eq!(fees.estimate_refund_gas_fee(None), expected);
    }

    #[test]
    fn test_net_refund_usdc() {
        let fees = FeeSchedule::default();
        let summary = fees.calculate_net_refund(Some(&record(dec!(1500.5), "USDC", "Ethereum")));
        assert_eq!(summary.service_fee, dec!(2));
        assert_eq!(summary.net_amount, dec!(1498.5));
        assert_eq!(summary.gas_fee_we_pay_amount, dec!(0.008));
        assert_eq!(summary.gas_fee_we_pay_token, "ETH");
    }

    #[test]
    fn test_net_refund_never_negative() {
        let fees = FeeSchedule::default();
        let summary = fees.calculate_net_refund(Some(&record(dec!(1), "USDC", "Polygon")));
        assert_eq!(summary.net_amount, Decimal::ZERO);
        assert_eq!(summary.service_fee, dec!(2));
    }

    #[test]
    fn test_service_fee_converted_into_token() {
        let fees = FeeSchedule::default();
        let summary = fees.calculate_net_refund(Some(&record(dec!(1), "ETH", "Ethereum")));
        assert_eq!(summary.service_fee, dec!(0.0008));
        assert_eq!(summary.net_amount, dec!(0.9992));

        let summary = fees.calculate_net_refund(Some(&record(dec!(10), "MATIC", "Polygon")));
        assert_eq!(summary.service_fee, dec!(2.5));
        assert_eq!(summary.net_amount, dec!(7.5));
    }

    #[test]
    fn test_unknown_currency_uses_unit_price() {
        let fees = FeeSchedule::default();
        let summary = fees.calculate_net_refund(Some(&record(dec!(50), "DAI", "Ethereum")));
        assert_eq!(summary.service_fee, FIXED_SERVICE_FEE);
        assert_eq!(summary.net_amount, dec!(48));
    }

    #[test]
    fn test_gas_is_not_deducted() {
        let fees = FeeSchedule::default();
        let summary = fees.calculate_net_refund(Some(&record(dec!(100), "USDC", "Ethereum")));
        assert_eq!(summary.net_amount, dec!(98));
    }

    #[test]
    fn test_degenerate_inputs_are_zeroed() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.calculate_net_refund(None), RefundSummary::zeroed());
        assert_eq!(
            fees.calculate_net_refund(Some(&record(dec!(0), "USDC", "Ethereum"))),
            RefundSummary::zeroed()
        );
        assert_eq!(
            fees.calculate_net_refund(Some(&record(dec!(10), "", "Ethereum"))),
            RefundSummary::zeroed()
        );
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let fees = FeeSchedule::default();
        let r = record(dec!(42.42), "USDT", "Optimism");
        assert_eq!(
            fees.calculate_net_refund(Some(&r)),
            fees.calculate_net_refund(Some(&r))
        );
    }

    #[test]
    fn test_non_positive_price_falls_back() {
        let mut fees = FeeSchedule::default();
        fees.token_prices.insert("USDC".to_string(), Decimal::ZERO);
        assert_eq!(fees.token_price("USDC"), dec!(1));
        assert_eq!(fees.service_fee_in("USDC"), dec!(2));
    }

    #[test]
    fn test_quote_with_overrides() {
        let fees = FeeSchedule::default();
        let r = record(dec!(100), "USDC", "Ethereum");
        let overrides = RefundOverrides {
            network: Some("Polygon".to_string()),
            service_fee_amount: Some(dec!(5)),
            service_fee_currency: Some("USDT".to_string()),
            ..Default::default()
        };
        let quote = fees.quote_with_overrides(&r, Some(&overrides)).unwrap();
        assert_eq!(quote.service_fee, dec!(5));
        assert_eq!(quote.net_amount, dec!(95));
        assert_eq!(quote.gas_fee_we_pay_amount, dec!(0.5));
        assert_eq!(quote.gas_fee_we_pay_token, "MATIC");

        assert_eq!(
            fees.quote_with_overrides(&r, None).unwrap(),
            fees.calculate_net_refund(Some(&r))
        );
    }

    #[test]
    fn test_oversized_override_fee_is_rejected() {
        let fees = FeeSchedule::default();
        let r = record(dec!(100), "USDC", "Ethereum");
        let overrides = RefundOverrides {
            service_fee_amount: Some(Decimal::from_i128_with_scale(10_i128.pow(26), 0)),
            service_fee_currency: Some("ETH".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            fees.quote_with_overrides(&r, Some(&overrides)),
            Err(RefundError::ValidationError(_))
        ));
        assert_eq!(fees.convert(dec!(1), "ETH", "USDC"), Some(dec!(2500)));
    }

    #[test]
    fn test_usd_value_overflow_is_none() {
        let fees = FeeSchedule::default();
        let huge = Decimal::from_i128_with_scale(10_i128.pow(26), 0);
        assert_eq!(fees.usd_value(huge, "ETH"), None);
        assert_eq!(fees.usd_value(huge, "USDC"), Some(huge));
    }

    #[test]
    fn test_partial_schedule_keeps_omitted_tables() {
        let json = r#"{ "token_prices": { "ETH": 3000 } }"#;
        let fees: FeeSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(fees.token_price("ETH"), dec!(3000));
        assert_eq!(fees.token_price("MATIC"), dec!(1));
        assert_eq!(fees.service_fee_usd, FIXED_SERVICE_FEE);
        assert_eq!(
            fees.estimate_refund_gas_fee(Some("Ethereum")),
            GasEstimate::new(dec!(0.008), "ETH")
        );
    }
}
