//! Shared test fixtures: a small hand-built disease/symptom corpus with a
//! classifier whose weights mirror the table, plus inert doubles for the
//! description and mail seams.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::dataset::SymptomTable;
use crate::descriptions::{DescriptionError, DescriptionSource};
use crate::mail::{MailError, VerificationMailer};
use crate::model::Classifier;

pub const FIXTURE_VOCABULARY: [&str; 10] = [
    "fever",
    "cough",
    "headache",
    "chills",
    "fatigue",
    "nausea",
    "sneezing",
    "sore throat",
    "vomiting",
    "rash",
];

/// Disease rows as (label, symptoms). Labels are listed sorted, matching
/// what the loader produces.
const FIXTURE_ROWS: [(&str, &[&str]); 12] = [
    ("Allergy", &["sneezing", "rash"]),
    ("Bronchitis", &["cough", "fatigue", "fever"]),
    ("Common Cold", &["cough", "sneezing", "sore throat", "headache"]),
    ("Dengue", &["fever", "headache", "rash", "vomiting", "chills"]),
    (
        "Flu",
        &["fever", "cough", "headache", "chills", "fatigue", "sore throat"],
    ),
    ("Gastritis", &["nausea", "vomiting"]),
    ("Heat Stroke", &["fever", "headache", "nausea", "fatigue"]),
    ("Malaria", &["fever", "chills", "vomiting", "headache"]),
    ("Migraine", &["headache", "nausea"]),
    ("Pneumonia", &["fever", "cough", "chills", "fatigue"]),
    ("Sinusitis", &["headache", "sneezing", "sore throat"]),
    ("Typhoid", &["fever", "fatigue", "headache", "nausea"]),
];

pub fn fixture_table() -> SymptomTable {
    let vocabulary: Vec<String> = FIXTURE_VOCABULARY.iter().map(|s| s.to_string()).collect();
    let labels: Vec<String> = FIXTURE_ROWS.iter().map(|(l, _)| l.to_string()).collect();
    let rows: HashMap<String, Vec<u8>> = FIXTURE_ROWS
        .iter()
        .map(|(label, symptoms)| {
            let flags = FIXTURE_VOCABULARY
                .iter()
                .map(|s| u8::from(symptoms.contains(s)))
                .collect();
            (label.to_string(), flags)
        })
        .collect();
    SymptomTable::from_parts(vocabulary, labels, rows).unwrap()
}

/// A classifier aligned with [`fixture_table`]: weight 4.0 where the
/// disease row has the symptom, 0.0 elsewhere, zero intercepts. Diseases
/// matching more of the reported symptoms always score higher.
pub fn fixture_classifier() -> Classifier {
    let coefficients: Vec<Vec<f64>> = FIXTURE_ROWS
        .iter()
        .map(|(_, symptoms)| {
            FIXTURE_VOCABULARY
                .iter()
                .map(|s| if symptoms.contains(s) { 4.0 } else { 0.0 })
                .collect()
        })
        .collect();
    let labels: Vec<String> = FIXTURE_ROWS.iter().map(|(l, _)| l.to_string()).collect();
    let intercepts = vec![0.0; FIXTURE_ROWS.len()];
    Classifier::from_parts(labels, coefficients, intercepts).unwrap()
}

/// Description source answering from a fixed map; unknown names fail.
pub struct StaticSource {
    known: HashMap<String, String>,
}

impl StaticSource {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            known: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// A source where every lookup fails, exercising the fallback path.
    pub fn failing() -> Self {
        Self::new(&[])
    }
}

impl DescriptionSource for StaticSource {
    fn summary(&self, name: &str) -> Result<String, DescriptionError> {
        self.known
            .get(name)
            .cloned()
            .ok_or_else(|| DescriptionError::Empty(name.to_string()))
    }
}

/// Mailer that records (recipient, otp) pairs instead of sending.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_otp_for(&self, recipient: &str) -> Option<String> {
        let sent = self.sent.lock().ok()?;
        sent.iter()
            .rev()
            .find(|(to, _)| to == recipient)
            .map(|(_, otp)| otp.clone())
    }
}

impl VerificationMailer for RecordingMailer {
    fn send_verification(&self, to: &str, otp: &str) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), otp.to_string()));
        }
        Ok(())
    }
}
