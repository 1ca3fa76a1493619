//! Filtering, ordering and aggregation over exception records.

use crate::domain::record::ExceptionRecord;
use crate::domain::taxonomy::{ErrorCategory, ErrorStatus};
use crate::error::{RefundError, Result};
use serde::Serialize;
use std::cmp::Reverse;
use std::str::FromStr;

/// A filter slot that either matches everything or one exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = RefundError>,
{
    type Err = RefundError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

/// Every predicate a record must satisfy to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Matched against transaction hash, sender and recipient addresses.
    pub search: String,
    /// Matched against the payment order id.
    pub payment_order_id: String,
    pub status: Selection<ErrorStatus>,
    pub category: Selection<ErrorCategory>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ExceptionRecord) -> bool {
        let search = self.search.to_lowercase();
        let order_id = self.payment_order_id.to_lowercase();

        let matches_search = [
            &record.transaction_hash,
            &record.from_address,
            &record.to_address,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&search));

        matches_search
            && record.payment_order_id.to_lowercase().contains(&order_id)
            && self.status.matches(&record.status())
            && self.category.matches(&record.category())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first.
    #[default]
    Recent,
    /// Largest paid amount first.
    Amount,
    /// Pending, processing, failed, then successful.
    Status,
}

impl FromStr for SortKey {
    type Err = RefundError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recent" => Ok(Self::Recent),
            "amount" => Ok(Self::Amount),
            "status" => Ok(Self::Status),
            other => Err(RefundError::UnknownEnumerationValue {
                kind: "sort key",
                value: other.to_string(),
            }),
        }
    }
}

/// Record counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub refund_success: usize,
    pub refund_failed: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: ErrorStatus) {
        self.total += 1;
        match status {
            ErrorStatus::Pending => self.pending += 1,
            ErrorStatus::Processing => self.processing += 1,
            ErrorStatus::RefundSuccess => self.refund_success += 1,
            ErrorStatus::RefundFailed => self.refund_failed += 1,
        }
    }
}

/// Lazily yields the records matching `filter`, in input order.
///
/// The returned iterator is `Clone`, so it can be restarted without
/// re-running the caller's query.
pub fn filter<'a>(
    records: &'a [ExceptionRecord],
    filter: &'a RecordFilter,
) -> impl Iterator<Item = &'a ExceptionRecord> + Clone {
    records.iter().filter(move |record| filter.matches(record))
}

/// Stable in-place ordering by `key`.
pub fn sort(records: &mut [&ExceptionRecord], key: SortKey) {
    match key {
        SortKey::Recent => records.sort_by_key(|r| Reverse(r.timestamp)),
        SortKey::Amount => records.sort_by_key(|r| Reverse(r.amount)),
        SortKey::Status => records.sort_by_key(|r| r.status().priority()),
    }
}

pub fn aggregate<'a, I>(records: I) -> StatusCounts
where
    I: IntoIterator<Item = &'a ExceptionRecord>,
{
    records
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, record| {
            counts.bump(record.status());
            counts
        })
}

/// Filters then orders `records`, cloning the survivors.
pub fn query_records(
    records: &[ExceptionRecord],
    record_filter: &RecordFilter,
    key: SortKey,
) -> Vec<ExceptionRecord> {
    let mut matched: Vec<&ExceptionRecord> = filter(records, record_filter).collect();
    sort(&mut matched, key);
    matched.into_iter().cloned().collect()
}
