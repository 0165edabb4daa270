use serde::{Deserialize, Serialize};

pub const REPORT_SAVED: &str = "✅ Report saved successfully";

/// Response for POST /api/weather-safety-data
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Query string for GET /api/user-searches
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub country: Option<String>,
    /// Kept as text so a bad value is reported after the key check.
    pub limit: Option<String>,
}
