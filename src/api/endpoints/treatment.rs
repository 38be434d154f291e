//! Home remedy lookup.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct TreatmentResponse {
    pub condition: String,
    pub remedies: Vec<String>,
}

/// GET /api/treatment/:condition
///
/// Unknown conditions answer with an empty remedy list rather than 404;
/// the triage results legitimately include diseases the remedy book does
/// not cover.
pub async fn lookup(
    State(ctx): State<ApiContext>,
    Path(condition): Path<String>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    let remedies = ctx.state.remedies.remedies_for(&condition);
    Ok(Json(TreatmentResponse { condition, remedies }))
}
