pub mod auth;
pub mod health;
pub mod treatment;
pub mod triage;
