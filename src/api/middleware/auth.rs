//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates against the session
//! store, and injects `SessionContext` into request extensions for
//! downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::auth::sessions::hash_token;

/// Require a valid bearer token from a logged-in user.
///
/// Accesses `ApiContext` from request extensions (injected by Extension
/// layer). On success: injects `SessionContext`, adds `Cache-Control`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let token_hash = hash_token(&token);

    let (user_id, username) = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions
            .authenticate(&token_hash)
            .ok_or(ApiError::Unauthorized)?
    }; // MutexGuard dropped here, before any .await

    req.extensions_mut().insert(SessionContext {
        user_id,
        username,
        token_hash,
    });

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));

    Ok(response)
}
