//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::mail::MailError;
use crate::triage::wizard::WizardError;
use crate::triage::TriageError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account temporarily locked")]
    LockedOut,
    #[error("Incorrect verification code")]
    OtpInvalid,
    #[error("Verification code expired")]
    OtpExpired,
    #[error("No known symptom matched the input")]
    NoSymptomMatch,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Flow conflict: {0}")]
    FlowConflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Verification email could not be sent")]
    MailFailure(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username/email or password".to_string(),
            ),
            ApiError::LockedOut => (
                StatusCode::TOO_MANY_REQUESTS,
                "LOCKED_OUT",
                "Too many failed attempts, try again later".to_string(),
            ),
            ApiError::OtpInvalid => (
                StatusCode::UNAUTHORIZED,
                "OTP_INVALID",
                "Incorrect verification code".to_string(),
            ),
            ApiError::OtpExpired => (
                StatusCode::GONE,
                "OTP_EXPIRED",
                "Verification code expired. Please register again.".to_string(),
            ),
            ApiError::NoSymptomMatch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_MATCH",
                "No known symptom matched the input".to_string(),
            ),
            ApiError::Conflict(detail) => {
                (StatusCode::CONFLICT, "CONFLICT", detail.clone())
            }
            ApiError::FlowConflict(detail) => {
                (StatusCode::CONFLICT, "FLOW_CONFLICT", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::MailFailure(detail) => {
                tracing::error!(detail, "verification email delivery failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "MAIL_FAILURE",
                    "Failed to send verification email. Please try again.".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::NoMatch => ApiError::NoSymptomMatch,
            TriageError::Model(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        ApiError::FlowConflict(err.to_string())
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::MailFailure(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn no_symptom_match_returns_422() {
        let response = ApiError::NoSymptomMatch.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NO_MATCH");
    }

    #[tokio::test]
    async fn otp_expired_returns_410() {
        let response = ApiError::OtpExpired.into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn mail_failure_returns_502_and_hides_detail() {
        let response = ApiError::MailFailure("relay refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("relay refused"));
    }

    #[tokio::test]
    async fn internal_returns_500_and_hides_detail() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn constraint_violation_maps_to_conflict() {
        let api_err: ApiError =
            DatabaseError::ConstraintViolation("username or email already registered".into())
                .into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn triage_no_match_maps_to_422() {
        let api_err: ApiError = TriageError::NoMatch.into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn wizard_error_maps_to_409() {
        let api_err: ApiError = WizardError::NoPendingConfirmation.into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
