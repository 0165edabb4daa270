use super::{ReportQuery, ReportStore};
use crate::errors::StoreError;
use crate::report::{Report, StoredReport};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process stand-in for the Mongo collection, used by the API tests.
#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<StoredReport>>,
    next_id: AtomicU64,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: Report) -> Result<String, StoreError> {
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.reports.lock().unwrap().push(StoredReport {
            id: id.clone(),
            report,
        });
        Ok(id)
    }

    async fn find(&self, query: &ReportQuery) -> Result<Vec<StoredReport>, StoreError> {
        let reports = self.reports.lock().unwrap();
        let mut matching: Vec<StoredReport> = reports
            .iter()
            .filter(|r| match &query.country {
                Some(country) => r.report.country() == Some(country.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        // None < Some, so missing timestamps end up last
        matching.sort_by(|a, b| b.report.timestamp().cmp(&a.report.timestamp()));
        matching.truncate(query.limit as usize);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(country: &str, timestamp: Option<&str>) -> Report {
        let mut body = format!(r#"{{"location":{{"country":"{country}"}}"#);
        if let Some(ts) = timestamp {
            body.push_str(&format!(r#","metadata":{{"timestamp":"{ts}"}}"#));
        }
        body.push('}');
        Report::from_json(body.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn orders_newest_first_and_applies_limit() {
        let store = MemoryReportStore::new();
        store.insert(report("US", Some("2024-01-02"))).await.unwrap();
        store.insert(report("US", None)).await.unwrap();
        store.insert(report("US", Some("2024-03-01"))).await.unwrap();
        store.insert(report("CA", Some("2024-09-09"))).await.unwrap();

        let found = store
            .find(&ReportQuery {
                country: Some("US".to_string()),
                limit: 10,
            })
            .await
            .unwrap();
        let stamps: Vec<_> = found.iter().map(|r| r.report.timestamp()).collect();
        assert_eq!(stamps, vec![Some("2024-03-01"), Some("2024-01-02"), None]);

        let found = store
            .find(&ReportQuery {
                country: None,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].report.country(), Some("CA"));
    }
}
