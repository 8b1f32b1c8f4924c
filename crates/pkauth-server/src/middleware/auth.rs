use crate::state::AppState;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use pkauth_core::{CredentialStore, Principal, StoreError, TokenPayload};
use pkauth_token::{SessionTokens, TokenError};
use serde_json::json;
use std::sync::Arc;

/// The principal attached to a request that passed the access guard.
#[derive(Clone, Debug)]
pub struct AuthenticatedPrincipal(pub Principal);

/// Why a presented token was refused. Only the response message is visible to
/// the caller; the variant is for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    MalformedToken,
    UnknownPrincipal,
    InvalidSignature,
    Expired,
}

impl ForbiddenReason {
    fn message(self) -> &'static str {
        match self {
            ForbiddenReason::MalformedToken | ForbiddenReason::UnknownPrincipal => "Forbidden",
            ForbiddenReason::InvalidSignature | ForbiddenReason::Expired => {
                "Access token is invalid"
            }
        }
    }
}

#[derive(Debug)]
pub enum GuardRejection {
    /// No bearer token presented.
    Unauthenticated,
    Forbidden(ForbiddenReason),
    /// Credential store failed during the lookup.
    Persistence(StoreError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthorized" })),
            )
                .into_response(),
            GuardRejection::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": reason.message() })),
            )
                .into_response(),
            GuardRejection::Persistence(e) => {
                tracing::error!(error = %e, "credential store lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Token found, payload read but not yet trusted.
struct Decoded<'r> {
    token: &'r str,
    claimed: TokenPayload,
}

/// Principal named by the claimed id, with its current personal key.
struct PrincipalLoaded<'r> {
    token: &'r str,
    principal: Principal,
}

/// Request-time verification pipeline:
/// `NoToken → Decoded → PrincipalLoaded → Verified`.
///
/// Each transition either yields the next state or rejects, and a rejection
/// skips everything after it.
pub struct AccessGuard<'a> {
    store: &'a dyn CredentialStore,
    tokens: &'a dyn SessionTokens,
}

impl<'a> AccessGuard<'a> {
    pub fn new(store: &'a dyn CredentialStore, tokens: &'a dyn SessionTokens) -> Self {
        Self { store, tokens }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, GuardRejection> {
        let token = extract_bearer(headers).ok_or(GuardRejection::Unauthenticated)?;
        let decoded = self.decode(token)?;
        let loaded = self.load(decoded).await?;
        self.verify(loaded)
    }

    fn decode<'r>(&self, token: &'r str) -> Result<Decoded<'r>, GuardRejection> {
        match self.tokens.decode_payload(token) {
            Ok(claimed) => Ok(Decoded { token, claimed }),
            Err(e) => {
                tracing::debug!(error = %e, "rejecting undecodable access token");
                Err(GuardRejection::Forbidden(ForbiddenReason::MalformedToken))
            }
        }
    }

    async fn load<'r>(&self, decoded: Decoded<'r>) -> Result<PrincipalLoaded<'r>, GuardRejection> {
        match self.store.find_by_id(&decoded.claimed.id).await {
            Ok(Some(principal)) => Ok(PrincipalLoaded {
                token: decoded.token,
                principal,
            }),
            Ok(None) => {
                tracing::debug!(principal_id = %decoded.claimed.id, "token names unknown principal");
                Err(GuardRejection::Forbidden(ForbiddenReason::UnknownPrincipal))
            }
            Err(e) => Err(GuardRejection::Persistence(e)),
        }
    }

    fn verify(&self, loaded: PrincipalLoaded<'_>) -> Result<Principal, GuardRejection> {
        let PrincipalLoaded { token, principal } = loaded;
        match self.tokens.verify(token, &principal.personal_key) {
            Ok(_) => Ok(principal),
            Err(e) => {
                let reason = match e {
                    TokenError::Expired { .. } => ForbiddenReason::Expired,
                    _ => ForbiddenReason::InvalidSignature,
                };
                tracing::info!(
                    principal_id = %principal.id,
                    kind = e.kind(),
                    "access token rejected"
                );
                Err(GuardRejection::Forbidden(reason))
            }
        }
    }
}

/// Axum middleware: authenticate the bearer token and attach the principal.
pub async fn require_principal(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    // The body is not `Sync`; only the parts are borrowed across the lookup.
    let (mut parts, body) = req.into_parts();
    let principal = AccessGuard::new(state.store.as_ref(), state.tokens.as_ref())
        .authenticate(&parts.headers)
        .await?;

    parts.extensions.insert(AuthenticatedPrincipal(principal));
    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`. Any other shape counts as no token.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
