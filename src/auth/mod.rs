//! Account security primitives: password hashing, one-time verification
//! codes, pending registrations, and bearer session tokens.

pub mod otp;
pub mod password;
pub mod registration;
pub mod sessions;
