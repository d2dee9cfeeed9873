use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};
use crate::state::AppState;

pub mod auth;
pub mod friends;
pub mod library;
pub mod ratings;
pub mod recommendations;
pub mod search;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Catalog
        .route("/catalog/search", get(search::search))
        // Ratings
        .route("/ratings", post(ratings::create))
        .route("/ratings", get(ratings::list_mine))
        .route("/ratings/community", get(ratings::community))
        .route("/ratings/:id", patch(ratings::edit_comment))
        .route("/ratings/:id", delete(ratings::remove))
        // Friends
        .route("/friends", get(friends::list))
        .route("/friends/invites", post(friends::create_invite))
        .route("/friends/accept", post(friends::accept_invite))
        // Library
        .route("/library", get(library::browse))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
