use crate::domain::fees::{FeeSchedule, RefundSummary};
use crate::domain::ports::ExceptionRepositoryBox;
use crate::domain::query::{self, RecordFilter, SortKey, StatusCounts};
use crate::domain::record::ExceptionRecord;
use crate::domain::refund::{self, RecipientKind, RefundRequest};
use crate::domain::taxonomy::{ErrorStatus, RefundBlockReason, RefundFailureReason};
use crate::error::{RefundError, Result};
use chrono::Utc;
use tracing::{info, warn};

/// The entry point used by presentation and chain-monitoring collaborators.
///
/// `RefundEngine` owns the record repository and the fee schedule. Every
/// mutating call loads a record, runs one transition on a copy and writes it
/// back only if the transition succeeded. Callers must not run two
/// transitions on the same record concurrently.
pub struct RefundEngine {
    repository: ExceptionRepositoryBox,
    fees: FeeSchedule,
}

impl RefundEngine {
    /// Creates a new `RefundEngine`.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store holding exception records.
    /// * `fees` - Gas and price tables used for reconciliation.
    pub fn new(repository: ExceptionRepositoryBox, fees: FeeSchedule) -> Self {
        Self { repository, fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Registers a newly detected exception.
    ///
    /// Pending records get their refund block assessed against `recipient`
    /// before they are stored.
    pub async fn ingest(
        &self,
        mut record: ExceptionRecord,
        recipient: RecipientKind,
    ) -> Result<Option<RefundBlockReason>> {
        let block_reason = if record.status() == ErrorStatus::Pending {
            refund::enter_pending(&mut record, recipient, &self.fees)?
        } else {
            None
        };
        info!(
            record_id = %record.id,
            category = %record.category(),
            status = %record.status(),
            block_reason = ?block_reason,
            "exception record ingested"
        );
        self.repository.insert(record).await?;
        Ok(block_reason)
    }

    pub async fn query_records(
        &self,
        filter: &RecordFilter,
        key: SortKey,
    ) -> Result<Vec<ExceptionRecord>> {
        let records = self.repository.list().await?;
        Ok(query::query_records(&records, filter, key))
    }

    pub async fn compute_stats(&self) -> Result<StatusCounts> {
        let records = self.repository.list().await?;
        Ok(query::aggregate(&records))
    }

    pub async fn compute_refund_summary(&self, id: &str) -> Result<RefundSummary> {
        let record = self.load(id).await?;
        Ok(self.fees.calculate_net_refund(Some(&record)))
    }

    /// Moves a pending or failed record into `processing`.
    pub async fn request_refund(&self, id: &str, request: RefundRequest) -> Result<RefundSummary> {
        let mut record = self.load(id).await?;
        let initiator = request.initiator;
        let quote = refund::request_refund(&mut record, request, &self.fees, Utc::now())
            .inspect_err(|e| warn!(record_id = %id, error = %e, "refund request rejected"))?;
        info!(
            record_id = %id,
            ?initiator,
            attempts = record.refund_attempts(),
            net_amount = %quote.net_amount,
            "refund submitted"
        );
        self.repository.update(record).await?;
        Ok(quote)
    }

    /// Clears the block on a pending record once its cause has been remediated.
    pub async fn resolve_block(&self, id: &str) -> Result<()> {
        let mut record = self.load(id).await?;
        let cleared = record.refund_block_reason();
        refund::resolve_block(&mut record)
            .inspect_err(|e| warn!(record_id = %id, error = %e, "block resolution rejected"))?;
        info!(record_id = %id, cleared = ?cleared, "refund block resolved");
        self.repository.update(record).await
    }

    pub async fn confirm_settlement(&self, id: &str) -> Result<()> {
        let mut record = self.load(id).await?;
        refund::confirm_settlement(&mut record)
            .inspect_err(|e| warn!(record_id = %id, error = %e, "settlement rejected"))?;
        info!(record_id = %id, "refund settled");
        self.repository.update(record).await
    }

    pub async fn report_failure(&self, id: &str, reason: RefundFailureReason) -> Result<()> {
        let mut record = self.load(id).await?;
        refund::report_failure(&mut record, reason)
            .inspect_err(|e| warn!(record_id = %id, error = %e, "failure report rejected"))?;
        info!(record_id = %id, %reason, "refund failed");
        self.repository.update(record).await
    }

    /// Consumes the engine and returns every record in insertion order.
    pub async fn into_records(self) -> Result<Vec<ExceptionRecord>> {
        self.repository.list().await
    }

    async fn load(&self, id: &str) -> Result<ExceptionRecord> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| RefundError::RecordNotFound(id.to_string()))
    }
}
