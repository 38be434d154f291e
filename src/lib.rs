//! MediCURE: symptom-to-disease suggestion service.
//!
//! A logistic-regression classifier over a binary symptom vocabulary drives
//! a two-round triage flow: free-text symptoms are matched against the
//! vocabulary, the top candidate diseases pick the follow-up questions, and
//! the confirmed symptom set yields the final ranked conditions with
//! Wikipedia-sourced descriptions and home-remedy suggestions. Accounts are
//! email-verified; the triage flow lives in bearer-token sessions.

pub mod api;
pub mod auth;
pub mod config;
pub mod dataset;
pub mod db;
pub mod descriptions;
pub mod mail;
pub mod model;
pub mod remedies;
pub mod state;
pub mod triage;

#[cfg(test)]
pub(crate) mod testutil;
