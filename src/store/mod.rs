#[cfg(test)]
pub mod memory;
pub mod mongo;

use crate::errors::StoreError;
use crate::report::{Report, StoredReport};
use async_trait::async_trait;
pub use mongo::MongoReportStore;

/// Selection for `ReportStore::find`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// Exact match on `location.country`; `None` matches everything.
    pub country: Option<String>,
    pub limit: u32,
}

/// Append-only log of reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Appends a report and returns its generated id.
    async fn insert(&self, report: Report) -> Result<String, StoreError>;

    /// Matching reports, newest `metadata.timestamp` first, at most `query.limit`.
    /// Reports without a timestamp sort last.
    async fn find(&self, query: &ReportQuery) -> Result<Vec<StoredReport>, StoreError>;
}
