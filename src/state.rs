//! Immutable application state loaded once at startup.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::dataset::{DatasetError, SymptomTable};
use crate::descriptions::{DescriptionError, DescriptionProvider, WikipediaSource};
use crate::model::{Classifier, ModelError};
use crate::remedies::{RemedyBook, RemedyError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Remedies(#[from] RemedyError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error("model labels do not match dataset labels")]
    LabelMismatch,

    #[error("model expects {model} features but vocabulary has {dataset}")]
    FeatureCountMismatch { model: usize, dataset: usize },
}

/// Read-only triage artifacts shared across all requests. The dataset,
/// model, and remedy book never change after startup; the description
/// provider caches internally behind its own lock.
pub struct AppState {
    pub table: SymptomTable,
    pub classifier: Classifier,
    pub remedies: RemedyBook,
    pub descriptions: DescriptionProvider,
}

// The description provider holds a `Box<dyn DescriptionSource>`.
impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("table", &self.table)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble state from already-loaded parts, cross-checking that the
    /// classifier was trained against this exact dataset. Catching a label
    /// or feature drift here turns a silently wrong ranking into a refusal
    /// to start.
    pub fn new(
        table: SymptomTable,
        classifier: Classifier,
        remedies: RemedyBook,
        descriptions: DescriptionProvider,
    ) -> Result<Arc<Self>, StartupError> {
        if classifier.labels() != table.labels() {
            return Err(StartupError::LabelMismatch);
        }
        if classifier.n_features() != table.vocabulary().len() {
            return Err(StartupError::FeatureCountMismatch {
                model: classifier.n_features(),
                dataset: table.vocabulary().len(),
            });
        }
        Ok(Arc::new(Self {
            table,
            classifier,
            remedies,
            descriptions,
        }))
    }

    /// Load everything from the paths in `config`.
    pub fn load(config: &Config) -> Result<Arc<Self>, StartupError> {
        let table = SymptomTable::load(
            &config.combined_dataset_path,
            &config.normalized_dataset_path,
        )?;
        let classifier = Classifier::load(&config.model_path)?;
        let remedies = RemedyBook::load(&config.remedies_path)?;
        let source = WikipediaSource::new(
            &config.wikipedia_base_url,
            config.lookup_timeout.as_secs(),
        )?;
        let descriptions = DescriptionProvider::new(Box::new(source));

        tracing::info!(
            diseases = table.labels().len(),
            symptoms = table.vocabulary().len(),
            "Triage artifacts loaded"
        );

        Self::new(table, classifier, remedies, descriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptions::fallback_description;
    use crate::testutil::{fixture_classifier, fixture_table, StaticSource};

    fn provider() -> DescriptionProvider {
        DescriptionProvider::new(Box::new(StaticSource::failing()))
    }

    #[test]
    fn consistent_parts_assemble() {
        let state = AppState::new(
            fixture_table(),
            fixture_classifier(),
            RemedyBook::from_rows(&[]),
            provider(),
        )
        .unwrap();
        assert_eq!(state.table.labels(), state.classifier.labels());
    }

    #[test]
    fn label_drift_refuses_to_start() {
        let table = fixture_table();
        let mut labels: Vec<String> = table.labels().to_vec();
        labels.pop();
        labels.push("Zoster".into());

        let classifier = Classifier::from_parts(
            labels,
            vec![vec![0.0; table.vocabulary().len()]; table.labels().len()],
            vec![0.0; table.labels().len()],
        )
        .unwrap();

        let err = AppState::new(table, classifier, RemedyBook::from_rows(&[]), provider())
            .unwrap_err();
        assert!(matches!(err, StartupError::LabelMismatch));
    }

    #[test]
    fn feature_drift_refuses_to_start() {
        let table = fixture_table();
        let labels: Vec<String> = table.labels().to_vec();
        let n = labels.len();

        let classifier =
            Classifier::from_parts(labels, vec![vec![0.0; 3]; n], vec![0.0; n]).unwrap();

        let err = AppState::new(table, classifier, RemedyBook::from_rows(&[]), provider())
            .unwrap_err();
        assert!(matches!(err, StartupError::FeatureCountMismatch { .. }));
    }

    #[test]
    fn failing_source_still_describes() {
        let state = AppState::new(
            fixture_table(),
            fixture_classifier(),
            RemedyBook::from_rows(&[]),
            provider(),
        )
        .unwrap();
        assert_eq!(
            state.descriptions.describe("Flu"),
            fallback_description("Flu")
        );
    }
}
