//! Account endpoints: signup with email verification, login, logout.
//!
//! Signup stages the account in memory and emails a one-time code; the
//! account only reaches the database once the code is echoed back.
//! Password hashing runs on the blocking pool: PBKDF2 at the production
//! work factor takes hundreds of milliseconds.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::registration::VerifyOutcome;
use crate::db::users;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login_identifier: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.')
}

/// POST /api/auth/signup
pub async fn signup(
    State(ctx): State<ApiContext>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }
    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email address".into()));
    }

    {
        let conn = ctx.open_db()?;
        if users::username_exists(&conn, &username)? {
            return Err(ApiError::Conflict("Username already exists".into()));
        }
        if users::email_exists(&conn, &email)? {
            return Err(ApiError::Conflict("Email address already registered".into()));
        }
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await?;

    let otp = {
        let mut pending = ctx
            .pending
            .lock()
            .map_err(|_| ApiError::Internal("pending lock".into()))?;
        pending.insert(username.clone(), email.clone(), password_hash)
    };

    let mailer = Arc::clone(&ctx.mailer);
    let recipient = email.clone();
    let sent = tokio::task::spawn_blocking(move || mailer.send_verification(&recipient, &otp)).await?;
    if let Err(err) = sent {
        // Undeliverable code is useless; make the applicant sign up again.
        if let Ok(mut pending) = ctx.pending.lock() {
            pending.remove(&email);
        }
        return Err(err.into());
    }

    tracing::info!(%username, "Signup staged, verification code sent");
    Ok(Json(SignupResponse {
        message: "Verification code has been sent to your email.",
        email,
    }))
}

/// POST /api/auth/verify-otp
///
/// On success the account is persisted and, as with the original flow, the
/// user is logged straight in.
pub async fn verify_otp(
    State(ctx): State<ApiContext>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let outcome = {
        let mut pending = ctx
            .pending
            .lock()
            .map_err(|_| ApiError::Internal("pending lock".into()))?;
        pending.verify(&req.email, req.otp.trim())
    };

    let registration = match outcome {
        VerifyOutcome::Verified(reg) => reg,
        VerifyOutcome::WrongCode => return Err(ApiError::OtpInvalid),
        VerifyOutcome::Expired => return Err(ApiError::OtpExpired),
        // No pending entry is indistinguishable from one that timed out
        // and was swept; both mean "register again".
        VerifyOutcome::NotFound => return Err(ApiError::OtpExpired),
    };

    let user = {
        let conn = ctx.open_db()?;
        users::insert_user(
            &conn,
            &registration.username,
            &registration.email,
            &registration.password_hash,
        )?
    };

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.create(user.id, user.username.clone())
    };

    tracing::info!(username = %user.username, "Account created and verified");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            username: user.username,
        }),
    ))
}

/// POST /api/auth/resend-otp
pub async fn resend_otp(
    State(ctx): State<ApiContext>,
    Json(req): Json<ResendOtpRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let otp = {
        let mut pending = ctx
            .pending
            .lock()
            .map_err(|_| ApiError::Internal("pending lock".into()))?;
        pending.reissue(&req.email).ok_or_else(|| {
            ApiError::NotFound("no pending registration for that email".into())
        })?
    };

    let mailer = Arc::clone(&ctx.mailer);
    let recipient = req.email.clone();
    tokio::task::spawn_blocking(move || mailer.send_verification(&recipient, &otp)).await??;

    Ok(Json(SignupResponse {
        message: "New verification code has been sent to your email.",
        email: req.email,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let identifier = req.login_identifier.trim().to_string();

    {
        let lockout = ctx
            .lockout
            .lock()
            .map_err(|_| ApiError::Internal("lockout lock".into()))?;
        if lockout.is_locked(&identifier) {
            return Err(ApiError::LockedOut);
        }
    }

    let user = {
        let conn = ctx.open_db()?;
        users::find_by_identifier(&conn, &identifier)?
    };

    // Unknown identifier and wrong password answer identically.
    let verified = match &user {
        Some(user) => {
            let stored = user.password_hash.clone();
            let password = req.password;
            tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await?
        }
        None => false,
    };

    if !verified {
        if let Ok(mut lockout) = ctx.lockout.lock() {
            lockout.record_failure(&identifier);
        }
        return Err(ApiError::InvalidCredentials);
    }

    if let Ok(mut lockout) = ctx.lockout.lock() {
        lockout.clear(&identifier);
    }

    let user = user.ok_or(ApiError::InvalidCredentials)?;
    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.create(user.id, user.username.clone())
    };

    tracing::info!(username = %user.username, "Login");
    Ok(Json(SessionResponse {
        token,
        username: user.username,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// POST /api/auth/logout
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let mut sessions = ctx
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    sessions.revoke(&session.token_hash);
    Ok(Json(LogoutResponse {
        message: "Logged out.",
    }))
}
