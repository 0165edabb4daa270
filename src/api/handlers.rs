use super::AppState;
use super::models::{MessageResponse, REPORT_SAVED, SearchParams};
use crate::errors::ApiError;
use crate::report::{Report, StoredReport};
use crate::store::ReportQuery;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_LIMIT: u32 = 10;

/// GET /health — simple liveness check
pub async fn health() -> &'static str {
    "Server is up and running 🚀"
}

/// POST /api/weather-safety-data — append one report
pub async fn create_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    authorize(&headers, &state.api_key)?;

    let report = Report::from_json(&body)?;
    let label = format!(
        "{} @ {}",
        report.country().unwrap_or("unknown country"),
        report.timestamp().unwrap_or("no timestamp")
    );
    let id = state.bounded(state.store.insert(report)).await?;
    tracing::info!("Saved report {id} ({label})");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: REPORT_SAVED,
        }),
    ))
}

/// GET /api/user-searches?country=US&limit=5 — newest reports first
pub async fn list_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<Vec<StoredReport>>, ApiError> {
    authorize(&headers, &state.api_key)?;

    let Query(params) = Query::<SearchParams>::try_from_uri(&uri)
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = ReportQuery {
        country: params.country.filter(|c| !c.is_empty()),
        limit: parse_limit(params.limit.as_deref())?,
    };

    let reports = state.bounded(state.store.find(&query)).await?;
    Ok(Json(reports))
}

fn authorize(headers: &HeaderMap, api_key: &str) -> Result<(), ApiError> {
    match headers.get(API_KEY_HEADER) {
        Some(value) if value.as_bytes() == api_key.as_bytes() => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn parse_limit(raw: Option<&str>) -> Result<u32, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_LIMIT),
        Some(raw) => raw,
    };

    match raw.parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ApiError::BadRequest(format!(
            "limit must be a positive integer, got {raw:?}"
        ))),
    }
}
