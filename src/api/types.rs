//! Shared types for the HTTP API layer.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::registration::PendingStore;
use crate::auth::sessions::{LoginLockout, SessionStore};
use crate::mail::VerificationMailer;
use crate::state::AppState;

/// Shared context for all API routes and middleware.
///
/// The triage artifacts in `state` are immutable; the session, pending
/// registration, and lockout stores sit behind their own mutexes. SQLite
/// connections are opened per request (WAL mode keeps readers concurrent).
#[derive(Clone)]
pub struct ApiContext {
    pub state: Arc<AppState>,
    pub db_path: PathBuf,
    pub mailer: Arc<dyn VerificationMailer>,
    pub sessions: Arc<Mutex<SessionStore>>,
    pub pending: Arc<Mutex<PendingStore>>,
    pub lockout: Arc<Mutex<LoginLockout>>,
}

impl ApiContext {
    pub fn new(
        state: Arc<AppState>,
        db_path: PathBuf,
        mailer: Arc<dyn VerificationMailer>,
    ) -> Self {
        Self {
            state,
            db_path,
            mailer,
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            pending: Arc::new(Mutex::new(PendingStore::new())),
            lockout: Arc::new(Mutex::new(LoginLockout::new())),
        }
    }

    /// Open a connection to the user database for this request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        crate::db::open_database(&self.db_path).map_err(ApiError::from)
    }
}

/// Authenticated user context, injected into request extensions by the
/// auth middleware after the session token checks out.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub username: String,
    pub token_hash: [u8; 32],
}
