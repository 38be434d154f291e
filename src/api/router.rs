//! HTTP API router.
//!
//! Returns a composable `Router` with all endpoints nested under `/api/`.
//! Account creation, login, and the health check are public; everything
//! else requires a bearer session token.
//!
//! Middleware uses `Extension<ApiContext>` (injected as the outermost
//! layer). Endpoint handlers use `State<ApiContext>` via `with_state`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // Protected routes: bearer auth injects SessionContext.
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/triage/symptoms", post(endpoints::triage::symptoms))
        .route("/triage/questions", get(endpoints::triage::questions))
        .route("/triage/confirm", post(endpoints::triage::confirm))
        .route("/triage/results", get(endpoints::triage::results))
        .route("/treatment/:condition", get(endpoints::treatment::lookup))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Public routes (no session yet)
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/signup", post(endpoints::auth::signup))
        .route("/auth/verify-otp", post(endpoints::auth::verify_otp))
        .route("/auth/resend-otp", post(endpoints::auth::resend_otp))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", public)
        .layer(CorsLayer::permissive())
}
