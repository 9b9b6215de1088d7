//! Response post-processing shared by every route.

use std::any::Any;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;

use crate::error::{ApiError, ErrorBody, InternalErrorDetail};
use crate::state::AppState;

/// In development, rewrite 5xx envelopes to carry the withheld internal
/// detail. Production responses pass through untouched.
pub async fn expose_internal_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(internal) = response.extensions_mut().remove::<InternalErrorDetail>() else {
        return response;
    };
    if !state.config.is_development() {
        return response;
    }
    let status = response.status();
    (
        status,
        Json(ErrorBody::new(internal.message, Value::String(internal.detail))),
    )
        .into_response()
}

/// Turn a handler panic into the standard 500 envelope.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(detail).into_response()
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
