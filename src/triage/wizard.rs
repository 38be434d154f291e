//! Diagnostic wizard state machine.
//!
//! The original flow kept its intermediate results in loose session keys;
//! here the three stages are an explicit enum owned by the authenticated
//! session. Submitting symptoms restarts the flow from any stage;
//! confirming follow-up symptoms is only legal while a round-1 result is
//! pending.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("no symptom submission is awaiting confirmation")]
    NoPendingConfirmation,
}

/// One final condition as shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConditionReport {
    pub name: String,
    /// Percentage, one decimal place.
    pub probability: f64,
    pub matched_symptoms: Vec<String>,
    pub description: String,
}

/// Per-session wizard state. Transient: overwritten on every new flow.
#[derive(Debug, Clone, Default)]
pub enum WizardState {
    #[default]
    AwaitingSymptoms,
    AwaitingConfirmation {
        found: Vec<String>,
        suggested: Vec<String>,
    },
    ShowingResults {
        conditions: Vec<ConditionReport>,
    },
}

impl WizardState {
    /// Start (or restart) a flow with the round-1 output.
    pub fn begin(&mut self, found: Vec<String>, suggested: Vec<String>) {
        *self = WizardState::AwaitingConfirmation { found, suggested };
    }

    /// Complete the flow with the round-2 results. Legal only while a
    /// confirmation is pending.
    pub fn complete(&mut self, conditions: Vec<ConditionReport>) -> Result<(), WizardError> {
        match self {
            WizardState::AwaitingConfirmation { .. } => {
                *self = WizardState::ShowingResults { conditions };
                Ok(())
            }
            _ => Err(WizardError::NoPendingConfirmation),
        }
    }

    /// The pending round-1 output, if the flow is awaiting confirmation.
    pub fn pending(&self) -> Option<(&[String], &[String])> {
        match self {
            WizardState::AwaitingConfirmation { found, suggested } => {
                Some((found.as_slice(), suggested.as_slice()))
            }
            _ => None,
        }
    }

    /// The final conditions, if the flow has completed.
    pub fn results(&self) -> Option<&[ConditionReport]> {
        match self {
            WizardState::ShowingResults { conditions } => Some(conditions.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str) -> ConditionReport {
        ConditionReport {
            name: name.into(),
            probability: 42.0,
            matched_symptoms: vec!["fever".into()],
            description: format!("About {name}."),
        }
    }

    #[test]
    fn starts_awaiting_symptoms() {
        let state = WizardState::default();
        assert!(state.pending().is_none());
        assert!(state.results().is_none());
    }

    #[test]
    fn begin_moves_to_awaiting_confirmation() {
        let mut state = WizardState::default();
        state.begin(vec!["fever".into()], vec!["chills".into()]);

        let (found, suggested) = state.pending().unwrap();
        assert_eq!(found, &["fever"]);
        assert_eq!(suggested, &["chills"]);
    }

    #[test]
    fn complete_requires_pending_confirmation() {
        let mut state = WizardState::default();
        assert!(matches!(
            state.complete(vec![report("Flu")]),
            Err(WizardError::NoPendingConfirmation)
        ));
    }

    #[test]
    fn complete_moves_to_results() {
        let mut state = WizardState::default();
        state.begin(vec!["fever".into()], vec![]);
        state.complete(vec![report("Flu")]).unwrap();

        assert_eq!(state.results().unwrap()[0].name, "Flu");
        assert!(state.pending().is_none());
    }

    #[test]
    fn new_submission_restarts_a_finished_flow() {
        let mut state = WizardState::default();
        state.begin(vec!["fever".into()], vec![]);
        state.complete(vec![report("Flu")]).unwrap();

        state.begin(vec!["nausea".into()], vec!["vomiting".into()]);
        assert!(state.results().is_none());
        let (found, _) = state.pending().unwrap();
        assert_eq!(found, &["nausea"]);
    }

    #[test]
    fn completing_twice_is_rejected() {
        let mut state = WizardState::default();
        state.begin(vec!["fever".into()], vec![]);
        state.complete(vec![report("Flu")]).unwrap();
        assert!(state.complete(vec![report("Cold")]).is_err());
    }
}
