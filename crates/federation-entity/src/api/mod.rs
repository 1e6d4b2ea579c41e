//! API module for the federation entity server

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::EntityContext;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(ctx: Arc<EntityContext>) -> Router {
    // CORS for browser-based management tooling
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Federation wire protocol
        .route(
            "/.well-known/openid-federation",
            get(handlers::entity_configuration),
        )
        .route("/fetch", get(handlers::fetch_subordinate))
        .route("/resolve", get(handlers::resolve_chain))
        // Entity management
        .route("/manage/entity", get(handlers::entity_info))
        .route(
            "/manage/entity/authority-hints",
            post(handlers::set_authority_hints),
        )
        .route(
            "/manage/entity/trust-marks",
            post(handlers::add_received_trust_mark).get(handlers::list_received_trust_marks),
        )
        // Subordinate management
        .route("/manage/fetch", get(handlers::statement_preview))
        .route(
            "/manage/subordinates",
            get(handlers::list_subordinates).post(handlers::upsert_subordinate),
        )
        .route(
            "/manage/subordinates/{*entity_id}",
            get(handlers::get_subordinate)
                .put(handlers::update_subordinate)
                .delete(handlers::delete_subordinate),
        )
        // Trust mark management
        .route(
            "/manage/trust-marks",
            post(handlers::trust_marks::issue).get(handlers::trust_marks::list),
        )
        .route(
            "/manage/trust-marks/{*trust_mark_id}",
            get(handlers::trust_marks::get).delete(handlers::trust_marks::revoke),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ctx)
}
