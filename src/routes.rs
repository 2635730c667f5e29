//! API route handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

use crate::config::AppConfig;
use crate::crawler::{run_fixtures, run_results};
use crate::dataset::{DatasetKey, Table};
use crate::storage::{DatasetDocument, DatasetStore};
use crate::types::{
    CrawlResponse, DatasetSummary, ErrorResponse, FixturesResponse, HealthResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DatasetStore>,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

fn find_dataset(state: &AppState, id: i64) -> Result<DatasetDocument, ApiError> {
    state
        .store
        .find_by_id(id)
        .map_err(|e| {
            error!("Failed to load dataset {}: {:#}", id, e);
            ApiError::internal("Failed to load dataset")
        })?
        .ok_or_else(|| ApiError::not_found(format!("Dataset {} not found", id)))
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Run a results crawl for one league season and period.
pub async fn extract(
    State(state): State<Arc<AppState>>,
    Path((country, tournament, season, time)): Path<(String, String, String, String)>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let key = DatasetKey::matches(&country, &tournament, &season, &time);
    key.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let report = run_results(&state.config, state.store.as_ref(), &key)
        .await
        .map_err(|e| {
            error!("Extraction of {} failed: {:#}", key, e);
            ApiError::internal("Extraction failed")
        })?;

    Ok(Json(CrawlResponse {
        message: format!("Extraction of {} finished", key.filename()),
        report,
    }))
}

/// Refresh the fixtures of one league season.
pub async fn fixtures(
    State(state): State<Arc<AppState>>,
    Path((country, tournament, season)): Path<(String, String, String)>,
) -> Result<Json<FixturesResponse>, ApiError> {
    let key = DatasetKey::fixtures(&country, &tournament, &season);
    key.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;

    let report = run_fixtures(&state.config, state.store.as_ref(), &key)
        .await
        .map_err(|e| {
            error!("Fixtures extraction of {} failed: {:#}", key, e);
            ApiError::internal("Fixtures extraction failed")
        })?;

    Ok(Json(FixturesResponse {
        message: format!("Fixtures of {} stored", key.filename()),
        report,
    }))
}

/// List stored datasets.
pub async fn list_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DatasetSummary>>, ApiError> {
    let docs = state.store.find_all().map_err(|e| {
        error!("Failed to list datasets: {:#}", e);
        ApiError::internal("Failed to list datasets")
    })?;

    Ok(Json(docs.into_iter().map(DatasetSummary::from).collect()))
}

/// Dataset rows as JSON objects keyed by column.
pub async fn dataset_rows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let doc = find_dataset(&state, id)?;
    let table = Table::from_csv(&doc.file).map_err(|e| {
        error!("Dataset {} is not valid CSV: {:#}", doc.filename, e);
        ApiError::internal("Failed to read dataset")
    })?;

    Ok(Json(table.to_json_rows()))
}

/// Raw CSV download.
pub async fn download_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let doc = find_dataset(&state, id)?;
    let disposition = format!("attachment; filename={}", doc.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        doc.file,
    )
        .into_response())
}
