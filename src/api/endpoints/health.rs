//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config::APP_VERSION;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub diseases: usize,
    pub symptoms: usize,
}

pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
        diseases: ctx.state.table.labels().len(),
        symptoms: ctx.state.table.vocabulary().len(),
    })
}
