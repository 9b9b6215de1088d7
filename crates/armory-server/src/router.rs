use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{docs, handler, middleware};

/// Build the axum router with every API endpoint, error handling layers and
/// the static front-end fallback.
pub fn build_router(state: AppState) -> Router {
    let vehicle = "/api/vehicles/:group/:category/:nation/:identifier";

    let router = Router::new()
        .route("/api", get(docs::api_docs))
        .route("/api/health", get(handler::health))
        .route("/api/nations", get(handler::list_nations))
        .route("/api/nations/:id", get(handler::get_nation))
        .route("/api/vehicles", get(handler::overview))
        .route("/api/vehicles/:group", get(handler::group_overview))
        .route("/api/vehicles/:group/:category", get(handler::list_vehicles))
        .route(
            "/api/vehicles/:group/:category/:nation",
            get(handler::list_by_nation).post(handler::create_vehicle),
        )
        .route(
            vehicle,
            get(handler::get_vehicle)
                .patch(handler::update_vehicle)
                .delete(handler::delete_vehicle),
        )
        .method_not_allowed_fallback(middleware::method_not_allowed)
        .fallback(handler::fallback)
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::expose_internal_details,
        ))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.with_state(state)
}
