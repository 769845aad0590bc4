use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod auth;
pub mod food;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the application router: open reads, caller-gated writes, OpenAPI document.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let max_bytes = state.uploads.max_bytes;

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/food/list", get(food::list_food))
        .route("/api-docs/openapi.json", get(crate::openapi::openapi_json));

    // caller required; the admin role is checked by the catalog service
    let protected = Router::new()
        .route("/api/food/add", post(food::add_food))
        .route("/api/food/remove", post(food::remove_food))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_caller));

    public
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_bytes))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
