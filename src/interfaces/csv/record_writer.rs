use super::row::RecordRow;
use crate::domain::fees::FeeSchedule;
use crate::domain::record::ExceptionRecord;
use crate::domain::taxonomy::Taxon;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Writes records back out in the same shape [`super::record_reader::RecordReader`] reads.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_records<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a ExceptionRecord>,
    ) -> Result<()> {
        for record in records {
            self.writer.serialize(RecordRow::from(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// One line of the reconciliation report.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    id: &'a str,
    payment_order_id: &'a str,
    status: &'static str,
    category: &'static str,
    action: &'static str,
    amount: String,
    currency: &'a str,
    net_amount: String,
    service_fee: String,
    gas_fee_we_pay: String,
    gas_fee_token: String,
    refund_attempts: u32,
    reason: &'static str,
}

fn display_amount(value: Decimal) -> String {
    format!("{value:.2}")
}

fn display_gas(value: Decimal) -> String {
    format!("{value:.6}")
}

/// Writes a human-facing report with fee figures rounded for display.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a ExceptionRecord>,
        fees: &FeeSchedule,
    ) -> Result<()> {
        for record in records {
            let summary = fees.calculate_net_refund(Some(record));
            let reason = record
                .refund_block_reason()
                .map(|r| r.description())
                .or_else(|| record.refund_failure_reason().map(|r| r.description()))
                .unwrap_or("");
            self.writer.serialize(ReportRow {
                id: &record.id,
                payment_order_id: &record.payment_order_id,
                status: record.status().as_str(),
                category: record.category().as_str(),
                action: record.action().as_str(),
                amount: display_amount(record.amount),
                currency: &record.currency,
                net_amount: display_amount(summary.net_amount),
                service_fee: display_amount(summary.service_fee),
                gas_fee_we_pay: display_gas(summary.gas_fee_we_pay_amount),
                gas_fee_token: summary.gas_fee_we_pay_token,
                refund_attempts: record.refund_attempts(),
                reason,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
