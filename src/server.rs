//! HTTP Server Assembly
//! Mission: Wire stores, token handling and routes into one axum app

use crate::auth::{api as auth_api, auth_middleware, JwtHandler, UserStore};
use crate::inventory::{api as sweets_api, SweetStore};
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub sweets: Arc<SweetStore>,
    pub jwt: Arc<JwtHandler>,
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    // Public auth routes
    let auth_router = Router::new()
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .with_state(state.clone());

    // Protected routes - every request passes the auth middleware, which
    // resolves the bearer token to a live user record.
    let protected_routes = Router::new()
        .route("/api/me", get(auth_api::me))
        .route(
            "/api/sweets",
            post(sweets_api::add_sweet).get(sweets_api::list_sweets),
        )
        .route("/api/sweets/search", get(sweets_api::search_sweets))
        .route(
            "/api/sweets/:id",
            put(sweets_api::update_sweet).delete(sweets_api::delete_sweet),
        )
        .route("/api/sweets/:id/purchase", post(sweets_api::purchase_sweet))
        .route("/api/sweets/:id/restock", post(sweets_api::restock_sweet))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    // Public routes (health check)
    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_router)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
