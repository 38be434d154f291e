//! Symptom table loading.
//!
//! Two CSV views share one symptom vocabulary: the *combined* view has one
//! row per disease occurrence and defines the label set the classifier was
//! trained on; the *normalized* view has exactly one row per disease and is
//! used to look up which symptoms a disease exhibits. Both are loaded once
//! at startup and are immutable for the process lifetime.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file} has no symptom columns")]
    EmptyVocabulary { file: String },

    #[error("{file} has no disease rows")]
    EmptyTable { file: String },

    #[error("symptom vocabulary differs between combined and normalized views")]
    VocabularyMismatch,

    #[error("row for '{label}' has {actual} flags, expected {expected}")]
    RowWidthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid symptom flag '{value}' for disease '{label}'")]
    InvalidFlag { label: String, value: String },

    #[error("duplicate row for disease '{0}' in normalized view")]
    DuplicateRow(String),

    #[error("disease '{0}' appears in only one of the two views")]
    LabelMismatch(String),
}

/// Static disease/symptom membership table, shared read-only after load.
#[derive(Debug)]
pub struct SymptomTable {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    labels: Vec<String>,
    rows: HashMap<String, Vec<u8>>,
}

impl SymptomTable {
    /// Load and cross-validate the combined and normalized CSV views.
    ///
    /// Any inconsistency between the views is a data-integrity fault and
    /// fails the load — corrupted static data must not serve requests.
    pub fn load(combined: &Path, normalized: &Path) -> Result<Self, DatasetError> {
        let (comb_vocab, comb_rows) = read_view(combined)?;
        let (norm_vocab, norm_rows) = read_view(normalized)?;

        if comb_vocab != norm_vocab {
            return Err(DatasetError::VocabularyMismatch);
        }

        let mut rows: HashMap<String, Vec<u8>> = HashMap::with_capacity(norm_rows.len());
        for (label, flags) in norm_rows {
            if rows.insert(label.clone(), flags).is_some() {
                return Err(DatasetError::DuplicateRow(label));
            }
        }

        // Sorted distinct labels from the combined view; this is the order
        // the classifier's probability vector is aligned to.
        let labels: BTreeSet<String> = comb_rows.into_iter().map(|(label, _)| label).collect();

        for label in &labels {
            if !rows.contains_key(label) {
                return Err(DatasetError::LabelMismatch(label.clone()));
            }
        }
        for label in rows.keys() {
            if !labels.contains(label) {
                return Err(DatasetError::LabelMismatch(label.clone()));
            }
        }

        Self::from_parts(comb_vocab, labels.into_iter().collect(), rows)
    }

    /// Build a table from already-parsed parts, re-checking shape invariants.
    pub fn from_parts(
        vocabulary: Vec<String>,
        labels: Vec<String>,
        rows: HashMap<String, Vec<u8>>,
    ) -> Result<Self, DatasetError> {
        for (label, flags) in &rows {
            if flags.len() != vocabulary.len() {
                return Err(DatasetError::RowWidthMismatch {
                    label: label.clone(),
                    expected: vocabulary.len(),
                    actual: flags.len(),
                });
            }
        }
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Ok(Self {
            vocabulary,
            index,
            labels,
            rows,
        })
    }

    /// Fixed, ordered symptom vocabulary (combined-view column order).
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Sorted distinct disease labels, matching classifier output order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Column index of a vocabulary symptom.
    pub fn symptom_index(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    /// The 0/1 symptom row for a disease (normalized view).
    pub fn symptom_row(&self, disease: &str) -> Option<&[u8]> {
        self.rows.get(disease).map(Vec::as_slice)
    }
}

/// Parse one CSV view into (vocabulary, rows). The first column is the
/// disease label; every remaining column is a 0/1 symptom flag.
fn read_view(path: &Path) -> Result<(Vec<String>, Vec<(String, Vec<u8>)>), DatasetError> {
    let file = path.display().to_string();
    let wrap = |source: csv::Error| DatasetError::Csv {
        file: file.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(wrap)?;

    let headers = reader.headers().map_err(wrap)?.clone();
    let vocabulary: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if vocabulary.is_empty() {
        return Err(DatasetError::EmptyVocabulary { file });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(wrap)?;
        let mut fields = record.iter();
        let label = fields.next().unwrap_or_default().trim().to_string();

        let mut flags = Vec::with_capacity(vocabulary.len());
        for value in fields {
            match value.trim() {
                "0" => flags.push(0),
                "1" => flags.push(1),
                other => {
                    return Err(DatasetError::InvalidFlag {
                        label,
                        value: other.to_string(),
                    })
                }
            }
        }
        if flags.len() != vocabulary.len() {
            return Err(DatasetError::RowWidthMismatch {
                label,
                expected: vocabulary.len(),
                actual: flags.len(),
            });
        }
        rows.push((label, flags));
    }

    if rows.is_empty() {
        return Err(DatasetError::EmptyTable { file });
    }
    Ok((vocabulary, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const COMBINED: &str = "\
label_dis,fever,cough,headache
Flu,1,1,1
Flu,1,1,0
Common Cold,0,1,0
Migraine,0,0,1
";

    const NORMALIZED: &str = "\
label_dis,fever,cough,headache
Flu,1,1,1
Common Cold,0,1,0
Migraine,0,0,1
";

    #[test]
    fn loads_and_sorts_distinct_labels() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(dir.path(), "comb.csv", COMBINED);
        let norm = write_csv(dir.path(), "norm.csv", NORMALIZED);

        let table = SymptomTable::load(&comb, &norm).unwrap();
        assert_eq!(table.vocabulary(), &["fever", "cough", "headache"]);
        assert_eq!(table.labels(), &["Common Cold", "Flu", "Migraine"]);
        assert_eq!(table.symptom_row("Flu").unwrap(), &[1, 1, 1]);
        assert_eq!(table.symptom_index("headache"), Some(2));
        assert_eq!(table.symptom_index("nausea"), None);
    }

    #[test]
    fn vocabulary_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(dir.path(), "comb.csv", COMBINED);
        let norm = write_csv(
            dir.path(),
            "norm.csv",
            "label_dis,fever,cough,nausea\nFlu,1,1,1\nCommon Cold,0,1,0\nMigraine,0,0,1\n",
        );

        let err = SymptomTable::load(&comb, &norm).unwrap_err();
        assert!(matches!(err, DatasetError::VocabularyMismatch));
    }

    #[test]
    fn disease_missing_from_normalized_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(dir.path(), "comb.csv", COMBINED);
        let norm = write_csv(
            dir.path(),
            "norm.csv",
            "label_dis,fever,cough,headache\nFlu,1,1,1\nCommon Cold,0,1,0\n",
        );

        let err = SymptomTable::load(&comb, &norm).unwrap_err();
        assert!(matches!(err, DatasetError::LabelMismatch(label) if label == "Migraine"));
    }

    #[test]
    fn duplicate_normalized_row_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(dir.path(), "comb.csv", COMBINED);
        let norm = write_csv(
            dir.path(),
            "norm.csv",
            "label_dis,fever,cough,headache\nFlu,1,1,1\nFlu,1,1,0\nCommon Cold,0,1,0\nMigraine,0,0,1\n",
        );

        let err = SymptomTable::load(&comb, &norm).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateRow(label) if label == "Flu"));
    }

    #[test]
    fn non_binary_flag_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(
            dir.path(),
            "comb.csv",
            "label_dis,fever,cough,headache\nFlu,1,2,1\n",
        );
        let norm = write_csv(dir.path(), "norm.csv", NORMALIZED);

        let err = SymptomTable::load(&comb, &norm).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidFlag { value, .. } if value == "2"));
    }

    #[test]
    fn empty_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let comb = write_csv(dir.path(), "comb.csv", "label_dis,fever,cough,headache\n");
        let norm = write_csv(dir.path(), "norm.csv", NORMALIZED);

        let err = SymptomTable::load(&comb, &norm).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyTable { .. }));
    }
}
