//! Two-round candidate ranking.
//!
//! Round 1 classifies the matched symptoms, keeps the 10 most probable
//! diseases, and derives up to 15 follow-up symptoms worth asking about,
//! each weighted by the summed probability of the candidate diseases that
//! exhibit it. Round 2 re-classifies the confirmed symptom set and produces
//! the final top 5 with matched symptoms and display percentages.
//!
//! Both rounds are pure: they read the shared table/classifier and return
//! plain values; the caller owns persistence into the wizard state.

use std::collections::HashSet;

use serde::Serialize;

use crate::dataset::SymptomTable;
use crate::model::Classifier;
use crate::triage::TriageError;

pub const ROUND_ONE_DISEASES: usize = 10;
pub const ROUND_ONE_QUESTIONS: usize = 15;
pub const ROUND_TWO_DISEASES: usize = 5;
pub const MATCHED_SYMPTOM_CAP: usize = 10;

/// One disease candidate with its raw classifier probability.
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseScore {
    pub name: String,
    pub probability: f64,
}

/// Output of round 1: the (unchanged) found set, the top candidates, and
/// the follow-up symptoms to ask the user about.
#[derive(Debug, Clone)]
pub struct RoundOne {
    pub found_symptoms: Vec<String>,
    pub candidates: Vec<DiseaseScore>,
    pub additional_symptoms: Vec<String>,
}

/// One final ranked condition. `probability` is a percentage rounded to one
/// decimal place; `matched_symptoms` is capped at the first ten.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Condition {
    pub name: String,
    pub probability: f64,
    pub matched_symptoms: Vec<String>,
}

/// Round 1: rank diseases for the found-symptom set and derive follow-up
/// questions.
pub fn rank_candidates(
    table: &SymptomTable,
    model: &Classifier,
    found: &[String],
) -> Result<RoundOne, TriageError> {
    let probs = model.predict_proba(&feature_vector(table, found))?;
    let top = top_indices(&probs, ROUND_ONE_DISEASES);

    let found_set: HashSet<&str> = found.iter().map(String::as_str).collect();
    let vocabulary = table.vocabulary();

    // Weight every symptom absent from the found set by the summed
    // probability of the top diseases that exhibit it.
    let mut weights = vec![0.0_f64; vocabulary.len()];
    for &idx in &top {
        let label = &table.labels()[idx];
        if let Some(row) = table.symptom_row(label) {
            for (col, &flag) in row.iter().enumerate() {
                if flag == 1 && !found_set.contains(vocabulary[col].as_str()) {
                    weights[col] += probs[idx];
                }
            }
        }
    }

    let mut weighted: Vec<usize> = (0..vocabulary.len())
        .filter(|&col| weights[col] > 0.0)
        .collect();
    // Stable sort: ties keep vocabulary order.
    weighted.sort_by(|&a, &b| weights[b].partial_cmp(&weights[a]).unwrap_or(std::cmp::Ordering::Equal));

    let additional_symptoms = weighted
        .into_iter()
        .take(ROUND_ONE_QUESTIONS)
        .map(|col| vocabulary[col].clone())
        .collect();

    let candidates = top
        .into_iter()
        .map(|idx| DiseaseScore {
            name: table.labels()[idx].clone(),
            probability: probs[idx],
        })
        .collect();

    Ok(RoundOne {
        found_symptoms: found.to_vec(),
        candidates,
        additional_symptoms,
    })
}

/// Round 2: rank the confirmed symptom set and report the final top 5.
pub fn refine(
    table: &SymptomTable,
    model: &Classifier,
    full: &[String],
) -> Result<Vec<Condition>, TriageError> {
    let probs = model.predict_proba(&feature_vector(table, full))?;

    let mut conditions = Vec::with_capacity(ROUND_TWO_DISEASES);
    for idx in top_indices(&probs, ROUND_TWO_DISEASES) {
        let name = table.labels()[idx].clone();

        let matched_symptoms = match table.symptom_row(&name) {
            Some(row) => {
                let mut seen = HashSet::new();
                full.iter()
                    .filter(|symptom| {
                        table
                            .symptom_index(symptom)
                            .is_some_and(|col| row[col] == 1)
                            && seen.insert(symptom.as_str())
                    })
                    .take(MATCHED_SYMPTOM_CAP)
                    .cloned()
                    .collect()
            }
            None => Vec::new(),
        };

        conditions.push(Condition {
            name,
            probability: round_percent(probs[idx]),
            matched_symptoms,
        });
    }

    Ok(conditions)
}

/// Binary feature vector over the vocabulary for the given symptom set.
fn feature_vector(table: &SymptomTable, present: &[String]) -> Vec<f64> {
    let set: HashSet<&str> = present.iter().map(String::as_str).collect();
    table
        .vocabulary()
        .iter()
        .map(|symptom| if set.contains(symptom.as_str()) { 1.0 } else { 0.0 })
        .collect()
}

/// Indices of the `k` highest probabilities, descending. Stable: equal
/// probabilities keep ascending label order, the classifier's own ordering.
fn top_indices(probs: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probs.len()).collect();
    indices.sort_by(|&a, &b| probs[b].partial_cmp(&probs[a]).unwrap_or(std::cmp::Ordering::Equal));
    indices.truncate(k);
    indices
}

fn round_percent(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}
