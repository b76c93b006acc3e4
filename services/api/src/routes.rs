use crate::infra::{AppState, RegistryState, ScrapeRequest};
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use epr_dashboard::error::AppError;
use epr_dashboard::export::{
    csv_content_type, to_csv_bytes, ExportError, CSV_FILE_NAME, XLSX_CONTENT_TYPE,
    XLSX_FILE_NAME,
};
use epr_dashboard::registry::{CachedTable, TableSummary, TidyRow};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const SPREADSHEET_ENGINE_HEADER: HeaderName = HeaderName::from_static("x-spreadsheet-engine");

#[derive(Debug, Serialize)]
pub(crate) struct ScrapeResponse {
    pub(crate) summary: TableSummary,
    pub(crate) cached: bool,
    pub(crate) rows: Vec<TidyRow>,
}

pub(crate) fn with_registry_routes(state: RegistryState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/registry/scrape", post(scrape_endpoint))
        .route("/api/v1/registry/export/csv", post(export_csv_endpoint))
        .route("/api/v1/registry/export/xlsx", post(export_xlsx_endpoint))
        .route("/api/v1/registry/cache", delete(clear_cache_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Runs the blocking registry fetch off the async workers.
async fn fetch_selection(
    state: &RegistryState,
    request: ScrapeRequest,
) -> Result<CachedTable, AppError> {
    let selection = request.selection(state.default_record_limit)?;
    let service = Arc::clone(&state.service);
    let refresh = request.refresh;

    tokio::task::spawn_blocking(move || {
        if refresh {
            service.refresh(&selection)
        } else {
            service.fetch(&selection)
        }
    })
    .await
    .map_err(|err| AppError::Task(err.to_string()))?
    .map_err(AppError::from)
}

pub(crate) async fn scrape_endpoint(
    State(state): State<RegistryState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, AppError> {
    let result = fetch_selection(&state, request).await?;
    let summary = TableSummary::from_table(&result.table, Local::now().naive_local());

    Ok(Json(ScrapeResponse {
        summary,
        cached: result.cached,
        rows: result.table.rows().to_vec(),
    }))
}

pub(crate) async fn export_csv_endpoint(
    State(state): State<RegistryState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Response, AppError> {
    let result = fetch_selection(&state, request).await?;
    let bytes = to_csv_bytes(&result.table)?;
    Ok(attachment(csv_content_type().as_ref(), CSV_FILE_NAME, bytes))
}

pub(crate) async fn export_xlsx_endpoint(
    State(state): State<RegistryState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Response, AppError> {
    state.exporter.availability().map_err(ExportError::from)?;

    let result = fetch_selection(&state, request).await?;
    let export = state.exporter.to_spreadsheet_bytes(&result.table)?;

    let mut response = attachment(XLSX_CONTENT_TYPE, XLSX_FILE_NAME, export.bytes);
    response.headers_mut().insert(
        SPREADSHEET_ENGINE_HEADER,
        HeaderValue::from_static(export.engine),
    );
    Ok(response)
}

pub(crate) async fn clear_cache_endpoint(
    State(state): State<RegistryState>,
) -> Json<serde_json::Value> {
    let evicted = state.service.cache().clear();
    info!(evicted, "result cache cleared");
    Json(json!({ "evicted": evicted }))
}

fn attachment(content_type: &str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
