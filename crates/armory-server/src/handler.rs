//! Request handlers for the `/api` surface.
//!
//! Reads run inline: they only take a category read lock. Mutations write the
//! category document to disk while holding its write lock, so they run on the
//! blocking pool.

use std::sync::Arc;

use armory_catalog::{Catalog, CatalogResult, ListQuery, Page};
use armory_types::{Category, Group, Identifier, Nation, VehicleRecord};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Raw listing parameters. Kept as strings so a non-numeric `page` or
/// `limit` falls back to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    fn into_query(self) -> ListQuery {
        ListQuery {
            search: self.q,
            page: self.page.and_then(|p| p.trim().parse().ok()),
            limit: self.limit.and_then(|l| l.trim().parse().ok()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub category: Category,
    #[serde(flatten)]
    pub page: Page<Value>,
}

#[derive(Debug, Serialize)]
pub struct NationRecords {
    pub category: Category,
    pub nation: String,
    pub count: usize,
    pub items: Vec<Value>,
}

// ---- Health and nations ----

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let report = state.catalog.load_report();
    let status = if report.iter().all(|status| status.loaded) {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "datasets": report,
    }))
}

pub async fn list_nations(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let nations = state.catalog.nations()?;
    Ok(Json(json!({ "count": nations.len(), "nations": nations })))
}

pub async fn get_nation(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Nation>> {
    let Path(id) = path?;
    Ok(Json(state.catalog.nation(&id)?.clone()))
}

// ---- Overviews ----

pub async fn overview(State(state): State<AppState>) -> ApiResult<Response> {
    Ok(Json(state.catalog.overview()?).into_response())
}

pub async fn group_overview(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(group) = path?;
    let group: Group = group
        .parse()
        .map_err(|_| ApiError::RouteNotFound(format!("/api/vehicles/{group}")))?;
    Ok(Json(state.catalog.group_overview(group)?).into_response())
}

// ---- Vehicle reads ----

pub async fn list_vehicles(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let Path((group, category)) = path?;
    let Query(params) = query?;
    let category = resolve_category(&group, &category)?;
    let page = state
        .catalog
        .list(category, &params.into_query(), state.config.page_limits())?;
    Ok(Json(ListResponse {
        category,
        page: page.map(|record| record.to_document(category)),
    }))
}

pub async fn list_by_nation(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> ApiResult<Json<NationRecords>> {
    let Path((group, category, nation)) = path?;
    let category = resolve_category(&group, &category)?;
    let records = state.catalog.list_by_nation(category, &nation)?;
    Ok(Json(NationRecords {
        category,
        nation,
        count: records.len(),
        items: documents(category, &records),
    }))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String, String)>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path((group, category, nation, identifier)) = path?;
    let category = resolve_category(&group, &category)?;
    let record = state
        .catalog
        .get(category, &nation, &Identifier::parse(&identifier))?;
    Ok(Json(record.to_document(category)))
}

// ---- Vehicle mutations ----

pub async fn create_vehicle(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Path((group, category, nation)) = path?;
    let category = resolve_category(&group, &category)?;
    let body = object_body(body)?;
    let record = run_blocking(&state, move |catalog| catalog.create(category, &nation, body)).await?;
    Ok((StatusCode::CREATED, Json(record.to_document(category))))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String, String)>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path((group, category, nation, identifier)) = path?;
    let category = resolve_category(&group, &category)?;
    let patch = object_body(body)?;
    let identifier = Identifier::parse(&identifier);
    let record = run_blocking(&state, move |catalog| {
        catalog.update(category, &nation, &identifier, patch)
    })
    .await?;
    Ok(Json(record.to_document(category)))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    path: Result<Path<(String, String, String, String)>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path((group, category, nation, identifier)) = path?;
    let category = resolve_category(&group, &category)?;
    let identifier = Identifier::parse(&identifier);
    run_blocking(&state, move |catalog| catalog.delete(category, &nation, &identifier)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Fallback ----

/// Unmatched `/api` paths get the JSON 404 envelope; everything else is
/// looked up in the public directory.
pub async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let is_api = path == "/api" || path.starts_with("/api/");
    match state.config.public_dir.as_ref() {
        Some(dir) if !is_api => match ServeDir::new(dir).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
        _ => ApiError::RouteNotFound(path).into_response(),
    }
}

// ---- Helpers ----

fn resolve_category(group: &str, category: &str) -> ApiResult<Category> {
    Category::from_route(group, category)
        .ok_or_else(|| ApiError::RouteNotFound(format!("/api/vehicles/{group}/{category}")))
}

fn object_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Map<String, Value>> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(other)) => Err(ApiError::MalformedBody(format!(
            "expected a JSON object, found {}",
            armory_types::record::json_type(&other)
        ))),
        Err(rejection) => Err(ApiError::MalformedBody(rejection.body_text())),
    }
}

fn documents(category: Category, records: &[VehicleRecord]) -> Vec<Value> {
    records
        .iter()
        .map(|record| record.to_document(category))
        .collect()
}

/// Run a catalog mutation on the blocking pool.
async fn run_blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&Catalog) -> CatalogResult<T> + Send + 'static,
    T: Send + 'static,
{
    let catalog = Arc::clone(&state.catalog);
    tokio::task::spawn_blocking(move || op(&catalog))
        .await
        .map_err(|e| ApiError::Internal(format!("catalog task failed: {e}")))?
        .map_err(ApiError::from)
}
