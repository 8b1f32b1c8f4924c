use crate::{
    auth::{
        models::{LoginRequest, RegisterRequest},
        password,
    },
    error::ApiError,
    state::AppState,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use pkauth_core::{Principal, StoreError};
use pkauth_token::PersonalKey;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "username or password is invalid";
const ALREADY_EXISTS: &str = "username or email already exists";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username, password and email are required".to_string(),
        ));
    }

    if state.store.exists_username_or_email(username, email).await? {
        return Err(ApiError::BadRequest(ALREADY_EXISTS.to_string()));
    }

    let password_hash = password::hash_password(req.password).await?;
    let principal = Principal::new(
        Uuid::new_v4().to_string(),
        username,
        email,
        req.name.filter(|n| !n.trim().is_empty()),
        password_hash,
        PersonalKey::generate(),
    );

    match state.store.insert(&principal).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration.
        Err(StoreError::Conflict(_)) => {
            return Err(ApiError::BadRequest(ALREADY_EXISTS.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(principal_id = %principal.id, username = %principal.username, "registered principal");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User is created" })),
    ))
}

/// Unknown username and wrong password give the same answer.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = req.username.trim();
    let Some(principal) = state.store.find_by_username(username).await? else {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(req.password, principal.password_hash.clone()).await? {
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let access_token = state
        .tokens
        .sign(&principal.payload(), &principal.personal_key)?;

    tracing::info!(principal_id = %principal.id, "issued access token");
    Ok(Json(json!({ "accessToken": access_token })))
}
