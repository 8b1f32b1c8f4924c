use crate::{error::ApiError, middleware::auth::AuthenticatedPrincipal, state::AppState};
use axum::{Extension, Json, extract::State, http::StatusCode};
use pkauth_core::PrincipalProfile;
use serde_json::json;
use std::sync::Arc;

pub async fn profile(
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Json<PrincipalProfile> {
    Json(principal.profile())
}

/// Rotate the caller's personal key, revoking every token issued to them,
/// including the one on this request.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    pkauth_token::revoke(state.store.as_ref(), &principal.id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "You have been logged out successfully" })),
    ))
}
