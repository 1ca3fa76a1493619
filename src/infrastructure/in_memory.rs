use crate::domain::ports::ExceptionRepository;
use crate::domain::record::ExceptionRecord;
use crate::error::{RefundError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Records {
    ordered: Vec<ExceptionRecord>,
    index: HashMap<String, usize>,
}

/// A thread-safe in-memory store for exception records.
///
/// Keeps records in insertion order with an id index on the side, so listing
/// is order-preserving and lookups stay constant time.
#[derive(Default, Clone)]
pub struct InMemoryExceptionRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryExceptionRepository {
    /// Creates a new, empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with `records`. Fails on duplicate ids.
    pub fn with_records(records: impl IntoIterator<Item = ExceptionRecord>) -> Result<Self> {
        let mut seeded = Records::default();
        for record in records {
            if seeded.index.contains_key(&record.id) {
                return Err(RefundError::DuplicateRecord(record.id));
            }
            seeded.index.insert(record.id.clone(), seeded.ordered.len());
            seeded.ordered.push(record);
        }
        Ok(Self {
            records: Arc::new(RwLock::new(seeded)),
        })
    }
}

#[async_trait]
impl ExceptionRepository for InMemoryExceptionRepository {
    async fn insert(&self, record: ExceptionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.index.contains_key(&record.id) {
            return Err(RefundError::DuplicateRecord(record.id));
        }
        let position = records.ordered.len();
        records.index.insert(record.id.clone(), position);
        records.ordered.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ExceptionRecord>> {
        let records = self.records.read().await;
        Ok(records.ordered.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<ExceptionRecord>> {
        let records = self.records.read().await;
        Ok(records
            .index
            .get(id)
            .map(|&position| records.ordered[position].clone()))
    }

    async fn update(&self, record: ExceptionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let position = *records
            .index
            .get(&record.id)
            .ok_or_else(|| RefundError::RecordNotFound(record.id.clone()))?;
        records.ordered[position] = record;
        Ok(())
    }
}
