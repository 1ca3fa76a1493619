use crate::domain::fees::FeeSchedule;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub const FEE_SCHEDULE_ENV: &str = "REFUND_RECON_FEE_SCHEDULE";
pub const LOG_FILTER_ENV: &str = "REFUND_RECON_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON fee schedule replacing the built-in gas and price tables.
    pub fee_schedule_path: Option<PathBuf>,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            fee_schedule_path: std::env::var_os(FEE_SCHEDULE_ENV).map(PathBuf::from),
            log_filter: std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "warn".to_string()),
        }
    }

    /// Loads the configured fee schedule, or the built-in one if none is set.
    pub fn fee_schedule(&self) -> Result<FeeSchedule> {
        match &self.fee_schedule_path {
            Some(path) => load_fee_schedule(path),
            None => Ok(FeeSchedule::default()),
        }
    }
}

pub fn load_fee_schedule(path: &Path) -> Result<FeeSchedule> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
