use super::record::ExceptionRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Storage for exception records, owned by whoever constructs the engine.
#[async_trait]
pub trait ExceptionRepository: Send + Sync {
    /// Adds a new record. Fails if a record with the same id exists.
    async fn insert(&self, record: ExceptionRecord) -> Result<()>;
    /// All records, in insertion order.
    async fn list(&self) -> Result<Vec<ExceptionRecord>>;
    async fn get(&self, id: &str) -> Result<Option<ExceptionRecord>>;
    /// Replaces an existing record. Fails if the id is unknown.
    async fn update(&self, record: ExceptionRecord) -> Result<()>;
}

pub type ExceptionRepositoryBox = Box<dyn ExceptionRepository>;
