//! Bearer-token sessions and login lockout.
//!
//! Tokens are opaque 32-byte random strings handed out at login. Only the
//! SHA-256 hash is retained server-side; a stolen session map leaks nothing
//! usable. Each session carries the user's triage wizard state so the
//! question-and-answer flow survives across requests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::triage::wizard::WizardState;

/// Sessions idle longer than this are dropped on next access.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(1800);

const LOCKOUT_MAX_FAILURES: u32 = 5;
const LOCKOUT_WINDOW: Duration = Duration::from_secs(900);

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// A logged-in user's server-side state.
#[derive(Debug)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub wizard: WizardState,
    last_seen: Instant,
}

impl Session {
    fn idle_expired(&self) -> bool {
        self.last_seen.elapsed() > SESSION_IDLE_TTL
    }
}

/// In-memory session store keyed by token hash.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<[u8; 32], Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return the bearer token to hand to the client.
    pub fn create(&mut self, user_id: Uuid, username: String) -> String {
        self.cleanup();
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            Session {
                user_id,
                username,
                wizard: WizardState::default(),
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Look up a session by token hash, refreshing its idle timer.
    /// Expired sessions are removed and treated as absent.
    pub fn authenticate(&mut self, token_hash: &[u8; 32]) -> Option<(Uuid, String)> {
        if self
            .sessions
            .get(token_hash)
            .is_some_and(|s| s.idle_expired())
        {
            self.sessions.remove(token_hash);
            return None;
        }
        let session = self.sessions.get_mut(token_hash)?;
        session.last_seen = Instant::now();
        Some((session.user_id, session.username.clone()))
    }

    /// Mutable access to the wizard state for an authenticated session.
    pub fn wizard_mut(&mut self, token_hash: &[u8; 32]) -> Option<&mut WizardState> {
        self.sessions.get_mut(token_hash).map(|s| &mut s.wizard)
    }

    /// Drop a session (logout). Returns `true` if one existed.
    pub fn revoke(&mut self, token_hash: &[u8; 32]) -> bool {
        self.sessions.remove(token_hash).is_some()
    }

    fn cleanup(&mut self) {
        self.sessions.retain(|_, s| !s.idle_expired());
    }

    #[cfg(test)]
    fn force_idle(&mut self, token_hash: &[u8; 32]) {
        if let Some(s) = self.sessions.get_mut(token_hash) {
            s.last_seen = Instant::now() - (SESSION_IDLE_TTL + Duration::from_secs(1));
        }
    }
}

/// Per-identifier login failure tracking with a sliding lockout window.
#[derive(Debug, Default)]
pub struct LoginLockout {
    failures: HashMap<String, Vec<Instant>>,
}

impl LoginLockout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, identifier: &str) -> bool {
        let Some(entries) = self.failures.get(identifier) else {
            return false;
        };
        let now = Instant::now();
        let recent = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < LOCKOUT_WINDOW)
            .count() as u32;
        recent >= LOCKOUT_MAX_FAILURES
    }

    pub fn record_failure(&mut self, identifier: &str) {
        let now = Instant::now();
        let entries = self.failures.entry(identifier.to_string()).or_default();
        entries.retain(|ts| now.duration_since(*ts) < LOCKOUT_WINDOW);
        entries.push(now);
    }

    pub fn clear(&mut self, identifier: &str) {
        self.failures.remove(identifier);
    }
}
