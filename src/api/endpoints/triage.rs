//! Symptom triage endpoints: the two-round question-and-answer flow.
//!
//! All four endpoints operate on the wizard state stored in the caller's
//! session. Description lookups run on the blocking pool since the
//! Wikipedia client is synchronous.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::state::AppState;
use crate::triage::wizard::ConditionReport;
use crate::triage::{matcher, ranker};

#[derive(Deserialize)]
pub struct SymptomsRequest {
    pub symptoms: String,
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub found_symptoms: Vec<String>,
    pub additional_symptoms: Vec<String>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    /// Follow-up symptoms the user confirmed, chosen from the suggestions.
    pub selected: Vec<String>,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub conditions: Vec<ConditionReport>,
}

/// POST /api/triage/symptoms
///
/// Match free-text symptoms, run round 1, and stage the follow-up
/// questions. Restarts any flow already in progress.
pub async fn symptoms(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<SymptomsRequest>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let found = matcher::match_symptoms(&req.symptoms, ctx.state.table.vocabulary())?;
    let round = ranker::rank_candidates(&ctx.state.table, &ctx.state.classifier, &found)?;

    tracing::debug!(
        user = %session.username,
        found = round.found_symptoms.len(),
        questions = round.additional_symptoms.len(),
        "Round one complete"
    );

    let response = QuestionsResponse {
        found_symptoms: round.found_symptoms.clone(),
        additional_symptoms: round.additional_symptoms.clone(),
    };

    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let wizard = sessions
        .wizard_mut(&session.token_hash)
        .ok_or(ApiError::Unauthorized)?;
    wizard.begin(round.found_symptoms, round.additional_symptoms);

    Ok(Json(response))
}

/// GET /api/triage/questions
pub async fn questions(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let wizard = sessions
        .wizard_mut(&session.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    let (found, suggested) = wizard.pending().ok_or_else(|| {
        ApiError::FlowConflict("no symptom submission is awaiting confirmation".into())
    })?;

    Ok(Json(QuestionsResponse {
        found_symptoms: found.to_vec(),
        additional_symptoms: suggested.to_vec(),
    }))
}

/// POST /api/triage/confirm
///
/// Add the confirmed follow-up symptoms, run round 2, enrich with
/// descriptions, and store the final results in the session.
pub async fn confirm(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let (found, suggested) = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        let wizard = sessions
            .wizard_mut(&session.token_hash)
            .ok_or(ApiError::Unauthorized)?;
        let (found, suggested) = wizard.pending().ok_or_else(|| {
            ApiError::FlowConflict("no symptom submission is awaiting confirmation".into())
        })?;
        (found.to_vec(), suggested.to_vec())
    }; // Lock released before the blocking work below.

    // Selections must at least be real symptoms; ones that were never
    // suggested for this round are dropped rather than scored.
    let offered: HashSet<&str> = suggested.iter().map(String::as_str).collect();
    let mut full = found;
    for symptom in req.selected {
        if ctx.state.table.symptom_index(&symptom).is_none() {
            return Err(ApiError::BadRequest(format!(
                "'{symptom}' is not a known symptom"
            )));
        }
        if offered.contains(symptom.as_str()) && !full.contains(&symptom) {
            full.push(symptom);
        }
    }

    let ranked = ranker::refine(&ctx.state.table, &ctx.state.classifier, &full)?;

    let state: Arc<AppState> = Arc::clone(&ctx.state);
    let conditions = tokio::task::spawn_blocking(move || {
        ranked
            .into_iter()
            .map(|c| ConditionReport {
                description: state.descriptions.describe(&c.name),
                name: c.name,
                probability: c.probability,
                matched_symptoms: c.matched_symptoms,
            })
            .collect::<Vec<_>>()
    })
    .await?;

    {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        let wizard = sessions
            .wizard_mut(&session.token_hash)
            .ok_or(ApiError::Unauthorized)?;
        wizard.complete(conditions.clone())?;
    }

    tracing::debug!(
        user = %session.username,
        conditions = conditions.len(),
        "Round two complete"
    );
    Ok(Json(ResultsResponse { conditions }))
}

/// GET /api/triage/results
pub async fn results(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let wizard = sessions
        .wizard_mut(&session.token_hash)
        .ok_or(ApiError::Unauthorized)?;

    let conditions = wizard
        .results()
        .ok_or_else(|| ApiError::FlowConflict("no completed triage flow".into()))?;

    Ok(Json(ResultsResponse {
        conditions: conditions.to_vec(),
    }))
}
