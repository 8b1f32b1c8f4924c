//! # pkauth-server
//!
//! HTTP surface for pkauth:
//!
//! | Route | Guarded | Purpose |
//! |-------|---------|---------|
//! | `POST /api/v1/auth/register` | no | create a principal |
//! | `POST /api/v1/auth/login` | no | issue an access token |
//! | `GET /api/v1/users/profile` | yes | current principal |
//! | `POST /api/v1/users/logout` | yes | rotate personal key, revoking all tokens |

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde_json::json;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the full router over `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let users = Router::new()
        .route("/profile", get(middleware::handlers::profile))
        .route("/logout", post(middleware::handlers::logout))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_principal,
        ));

    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(healthz))
        .nest("/api/v1/auth", auth::routes::router())
        .nest("/api/v1/users", users)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to our service!" }))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "pkauth-server" }))
}
