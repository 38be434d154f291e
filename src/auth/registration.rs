//! Pending registrations awaiting email verification.
//!
//! A signup does not touch the users table until the applicant proves
//! control of the email address by echoing back the one-time code.
//! Entries live in memory and expire after [`otp::OTP_TTL`].

use std::collections::HashMap;
use std::time::Instant;

use crate::auth::otp;

/// A signup that has been accepted but not yet verified.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub otp: String,
    issued_at: Instant,
}

impl PendingRegistration {
    fn expired(&self) -> bool {
        self.issued_at.elapsed() > otp::OTP_TTL
    }
}

/// Outcome of attempting to verify a pending registration.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// Code matched; the registration is removed and returned for persisting.
    Verified(PendingRegistration),
    /// Wrong code. The registration stays pending.
    WrongCode,
    /// The code expired; the registration is discarded.
    Expired,
    /// No pending registration for that email.
    NotFound,
}

/// In-memory store of pending registrations, keyed by lowercased email.
#[derive(Debug, Default)]
pub struct PendingStore {
    pending: HashMap<String, PendingRegistration>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending signup. A repeat signup for the same email
    /// replaces the earlier attempt and its code.
    pub fn insert(&mut self, username: String, email: String, password_hash: String) -> String {
        self.cleanup();
        let otp = otp::generate_otp();
        let key = email.to_lowercase();
        self.pending.insert(
            key,
            PendingRegistration {
                username,
                email,
                password_hash,
                otp: otp.clone(),
                issued_at: Instant::now(),
            },
        );
        otp
    }

    /// Check a submitted code for the given email.
    pub fn verify(&mut self, email: &str, submitted: &str) -> VerifyOutcome {
        let key = email.to_lowercase();
        let Some(entry) = self.pending.get(&key) else {
            return VerifyOutcome::NotFound;
        };

        if entry.expired() {
            self.pending.remove(&key);
            return VerifyOutcome::Expired;
        }

        if !otp::verify_otp(submitted, &entry.otp) {
            return VerifyOutcome::WrongCode;
        }

        match self.pending.remove(&key) {
            Some(entry) => VerifyOutcome::Verified(entry),
            None => VerifyOutcome::NotFound,
        }
    }

    /// Discard a pending registration (e.g. after a failed mail send).
    pub fn remove(&mut self, email: &str) {
        self.pending.remove(&email.to_lowercase());
    }

    /// Issue a fresh code for an existing pending registration, restarting
    /// its TTL. Returns `None` if there is nothing pending for that email.
    pub fn reissue(&mut self, email: &str) -> Option<String> {
        let entry = self.pending.get_mut(&email.to_lowercase())?;
        entry.otp = otp::generate_otp();
        entry.issued_at = Instant::now();
        Some(entry.otp.clone())
    }

    fn cleanup(&mut self) {
        self.pending.retain(|_, entry| !entry.expired());
    }

    #[cfg(test)]
    fn force_expire(&mut self, email: &str) {
        if let Some(entry) = self.pending.get_mut(&email.to_lowercase()) {
            entry.issued_at = Instant::now() - (otp::OTP_TTL + std::time::Duration::from_secs(1));
        }
    }
}
