//! Pre-trained classifier.
//!
//! A multinomial logistic-regression model exported to JSON at training
//! time: per-class coefficient rows over the symptom vocabulary, per-class
//! intercepts, and the sorted label list the probability vector is aligned
//! to. Loaded once at startup; inference is a single matrix-vector product
//! followed by a softmax.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model has no classes")]
    Empty,

    #[error("model labels are not sorted lexicographically")]
    LabelsNotSorted,

    #[error("model has {labels} labels but {rows} coefficient rows")]
    CoefficientRowCount { labels: usize, rows: usize },

    #[error("model has {labels} labels but {intercepts} intercepts")]
    InterceptCount { labels: usize, intercepts: usize },

    #[error("coefficient row for '{label}' has {actual} weights, expected {expected}")]
    CoefficientWidth {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature vector has {actual} entries, expected {expected}")]
    FeatureLength { expected: usize, actual: usize },
}

#[derive(Deserialize)]
struct ModelFile {
    labels: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// Immutable probabilistic multi-class classifier.
#[derive(Debug)]
pub struct Classifier {
    labels: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
}

impl Classifier {
    /// Load a model artifact from JSON and validate its shape.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let file: ModelFile = serde_json::from_str(&raw)?;
        Self::from_parts(file.labels, file.coefficients, file.intercepts)
    }

    /// Build a classifier from raw parts, validating every shape invariant.
    pub fn from_parts(
        labels: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Err(ModelError::Empty);
        }
        if !labels.windows(2).all(|w| w[0] < w[1]) {
            return Err(ModelError::LabelsNotSorted);
        }
        if coefficients.len() != labels.len() {
            return Err(ModelError::CoefficientRowCount {
                labels: labels.len(),
                rows: coefficients.len(),
            });
        }
        if intercepts.len() != labels.len() {
            return Err(ModelError::InterceptCount {
                labels: labels.len(),
                intercepts: intercepts.len(),
            });
        }
        let n_features = coefficients[0].len();
        for (label, row) in labels.iter().zip(&coefficients) {
            if row.len() != n_features {
                return Err(ModelError::CoefficientWidth {
                    label: label.clone(),
                    expected: n_features,
                    actual: row.len(),
                });
            }
        }

        Ok(Self {
            labels,
            coefficients,
            intercepts,
            n_features,
        })
    }

    /// Sorted disease labels the probability vector is aligned to.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Expected feature-vector length (symptom vocabulary size).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Probability for every label given one binary feature vector.
    ///
    /// Softmax over the per-class linear scores; the output is parallel to
    /// `labels()` and sums to ~1.0.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureLength {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let scores: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                intercept + row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
            })
            .collect();

        // Subtract the max score before exponentiating for numeric stability.
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}
