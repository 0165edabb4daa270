use super::{ReportQuery, ReportStore};
use crate::config::Config;
use crate::errors::StoreError;
use crate::report::{Report, StoredReport};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

const DEFAULT_DATABASE: &str = "test";
const COLLECTION: &str = "reports";

/// The stored shape: the report's fields plus Mongo's `_id`.
#[derive(Debug, Serialize, Deserialize)]
struct ReportDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(flatten)]
    report: Report,
}

impl From<ReportDocument> for StoredReport {
    fn from(doc: ReportDocument) -> Self {
        StoredReport {
            id: doc.id.to_hex(),
            report: doc.report,
        }
    }
}

#[derive(Clone)]
pub struct MongoReportStore {
    collection: Collection<ReportDocument>,
}

impl MongoReportStore {
    /// Builds the client and checks the connection in the background.
    ///
    /// Fails on an unparsable connection string, and on a `mongodb+srv://`
    /// host whose SRV records can't be resolved, since the seed list is
    /// unknown without them. An unreachable server is only logged and each
    /// request then fails on its own.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.mongo_uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        // the driver waits 30s for a server by default
        options.server_selection_timeout = Some(config.store_timeout);

        let client = Client::with_options(options)?;
        let database = match &config.mongo_db {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        tracing::info!(
            "Using MongoDB database '{}', collection '{}'",
            database.name(),
            COLLECTION
        );

        let ping_db = database.clone();
        tokio::spawn(async move {
            match ping_db.run_command(doc! { "ping": 1 }).await {
                Ok(_) => tracing::info!("Connected to MongoDB"),
                Err(e) => tracing::error!("MongoDB connection error: {e}"),
            }
        });

        Ok(Self {
            collection: database.collection(COLLECTION),
        })
    }
}

fn filter_for(query: &ReportQuery) -> Document {
    match query.country.as_deref() {
        Some(country) => doc! { "location.country": country },
        None => Document::new(),
    }
}

fn newest_first() -> Document {
    doc! { "metadata.timestamp": -1 }
}

#[async_trait]
impl ReportStore for MongoReportStore {
    async fn insert(&self, report: Report) -> Result<String, StoreError> {
        let doc = ReportDocument {
            id: ObjectId::new(),
            report,
        };
        self.collection.insert_one(&doc).await?;
        Ok(doc.id.to_hex())
    }

    async fn find(&self, query: &ReportQuery) -> Result<Vec<StoredReport>, StoreError> {
        let cursor = self
            .collection
            .find(filter_for(query))
            .sort(newest_first())
            .limit(i64::from(query.limit))
            .await?;

        let docs: Vec<ReportDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(StoredReport::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;
    use std::time::Duration;

    fn config_for(uri: &str) -> Config {
        Config {
            mongo_uri: uri.to_string(),
            mongo_db: None,
            api_key: "k".to_string(),
            api_port: 3000,
            store_timeout: Duration::from_millis(200),
            rate_limit_max: 100,
            rate_limit_window: Duration::from_secs(900),
        }
    }

    #[tokio::test]
    async fn unreachable_server_does_not_fail_connect() {
        // nothing listens on port 1; the driver only finds out when pinging
        let store = MongoReportStore::connect(&config_for("mongodb://127.0.0.1:1/travelsafe")).await;
        assert_eq!(store.unwrap().collection.namespace().db, "travelsafe");
    }

    #[tokio::test]
    async fn unparsable_uri_fails_connect() {
        let err = MongoReportStore::connect(&config_for("postgres://localhost"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unresolvable_srv_host_fails_connect() {
        let err = MongoReportStore::connect(&config_for(
            "mongodb+srv://cluster0.nonexistent-host.invalid/travelsafe",
        ))
        .await
        .err()
        .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn filters_on_country_only_when_given() {
        let all = ReportQuery {
            country: None,
            limit: 10,
        };
        assert_eq!(filter_for(&all), Document::new());

        let us = ReportQuery {
            country: Some("US".to_string()),
            limit: 10,
        };
        assert_eq!(filter_for(&us), doc! { "location.country": "US" });
    }

    #[test]
    fn document_round_trips_through_bson() {
        let report = Report::from_json(
            br#"{"location":{"country":"Japan","latitude":35.68},"covid19":{"cases":7},
                "metadata":{"timestamp":"2024-01-01T00:00:00Z","source_apis":["a"]}}"#,
        )
        .unwrap();
        let id = ObjectId::new();

        let stored = bson::to_document(&ReportDocument {
            id,
            report: report.clone(),
        })
        .unwrap();
        assert_eq!(stored.get_object_id("_id").unwrap(), id);
        assert_eq!(stored.get_document("location").unwrap().get_str("country").unwrap(), "Japan");
        assert!(stored.get_document("location").unwrap().get("city").is_none());

        let read: ReportDocument = bson::from_document(stored).unwrap();
        let read = StoredReport::from(read);
        assert_eq!(read.id, id.to_hex());
        assert_eq!(read.report, report);
    }

    #[test]
    fn reads_documents_written_with_loose_types() {
        // older writers stored counters as doubles and kept a version key
        let raw = doc! {
            "_id": ObjectId::new(),
            "__v": 0,
            "covid19": { "cases": 12.0_f64, "casesPerOneMillion": 3_i32 },
            "weather": { "humidity": 40_i64, "icon": bson::Bson::Null },
        };

        let read: ReportDocument = bson::from_document(raw).unwrap();
        let covid = read.report.covid19.unwrap();
        assert_eq!(covid.cases, Some(12));
        assert_eq!(covid.cases_per_one_million, Some(3.0));
        let weather = read.report.weather.unwrap();
        assert_eq!(weather.humidity, Some(40.0));
        assert_eq!(weather.icon, None);
    }
}
