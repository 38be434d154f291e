//! Free-text symptom matching.

use crate::triage::TriageError;

/// Match comma-separated user phrases against the symptom vocabulary.
///
/// Each phrase is trimmed and lower-cased; a vocabulary symptom matches when
/// any phrase is a case-insensitive substring of the symptom name. The
/// result preserves vocabulary order and contains no duplicates.
///
/// Returns [`TriageError::NoMatch`] when nothing matches — the caller should
/// re-prompt the user rather than fail the request chain.
pub fn match_symptoms(input: &str, vocabulary: &[String]) -> Result<Vec<String>, TriageError> {
    let phrases: Vec<String> = input
        .split(',')
        .map(|phrase| phrase.trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect();

    let mut found = Vec::new();
    for symptom in vocabulary {
        let name = symptom.to_lowercase();
        if phrases.iter().any(|phrase| name.contains(phrase.as_str())) {
            found.push(symptom.clone());
        }
    }

    if found.is_empty() {
        return Err(TriageError::NoMatch);
    }
    Ok(found)
}
