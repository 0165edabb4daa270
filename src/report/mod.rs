pub mod coerce;

use crate::errors::ReportError;
use serde::{Deserialize, Serialize};

/// One submitted weather/pandemic snapshot for a location.
///
/// Every block and field is optional; absent values are not stored.
/// Unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covid19: Option<Covid19>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Covid19 {
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub cases: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub today_cases: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub deaths: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub today_deaths: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub recovered: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub active: Option<i64>,
    #[serde(default, deserialize_with = "coerce::integer", skip_serializing_if = "Option::is_none")]
    pub critical: Option<i64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub cases_per_one_million: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub deaths_per_one_million: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Degrees in whatever unit the submitting client used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "coerce::number", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// ISO-8601 text; ordering is lexicographic.
    #[serde(default, deserialize_with = "coerce::string", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "coerce::string_list", skip_serializing_if = "Option::is_none")]
    pub source_apis: Option<Vec<String>>,
}

impl Report {
    /// Parses a request body. An empty body is an empty report.
    pub fn from_json(body: &[u8]) -> Result<Self, ReportError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    pub fn country(&self) -> Option<&str> {
        self.location.as_ref()?.country.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.as_ref()?.timestamp.as_deref()
    }
}

/// A report as read back from the store, with its generated id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub report: Report,
}
