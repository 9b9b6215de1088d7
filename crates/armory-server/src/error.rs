use armory_catalog::CatalogError;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned to API clients as `{"error": {"message", "details"}}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    pub details: Value,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            error: ErrorPayload {
                message: message.into(),
                details,
            },
        }
    }
}

/// Server-side detail withheld from the response body. Attached as a response
/// extension so development mode can put it back.
#[derive(Clone, Debug)]
pub struct InternalErrorDetail {
    pub message: String,
    pub detail: String,
}

impl ApiError {
    /// Status, client-facing message, client-facing details, and any internal
    /// detail that only development mode may reveal.
    fn parts(&self) -> (StatusCode, String, Value, Option<String>) {
        match self {
            Self::Catalog(err) => catalog_parts(err),
            Self::MalformedBody(reason) => (
                StatusCode::BAD_REQUEST,
                "malformed request body".into(),
                Value::String(reason.clone()),
                None,
            ),
            Self::InvalidPath(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid path parameter".into(),
                Value::String(reason.clone()),
                None,
            ),
            Self::InvalidQuery(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid query string".into(),
                Value::String(reason.clone()),
                None,
            ),
            Self::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                format!("no route for {path}"),
                Value::Null,
                None,
            ),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed".into(),
                Value::Null,
                None,
            ),
            Self::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
                Value::Null,
                Some(detail.clone()),
            ),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

fn catalog_parts(err: &CatalogError) -> (StatusCode, String, Value, Option<String>) {
    match err {
        CatalogError::NotLoaded { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            err.to_string(),
            Value::Null,
            None,
        ),
        CatalogError::NationNotFound {
            available_nations, ..
        } => (
            StatusCode::NOT_FOUND,
            err.to_string(),
            json!({ "available_nations": available_nations }),
            None,
        ),
        CatalogError::UnknownNation { .. } | CatalogError::RecordNotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string(), Value::Null, None)
        }
        CatalogError::Validation { violations } => (
            StatusCode::BAD_REQUEST,
            "validation failed".into(),
            json!(violations),
            None,
        ),
        CatalogError::Conflict { field, value, .. } => (
            StatusCode::CONFLICT,
            err.to_string(),
            json!({ "field": field, "value": value }),
            None,
        ),
        CatalogError::Persistence { category, source } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to save {category} data; no changes were applied"),
            Value::Null,
            Some(source.to_string()),
        ),
        CatalogError::LockPoisoned { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".into(),
            Value::Null,
            Some(err.to_string()),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details, internal) = self.parts();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }

        let mut response = (status, Json(ErrorBody::new(message.clone(), details))).into_response();
        if let Some(detail) = internal {
            response
                .extensions_mut()
                .insert(InternalErrorDetail { message, detail });
        }
        response
    }
}
