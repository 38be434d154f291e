//! Home-remedy lookup.
//!
//! A static two-column CSV maps a condition name to a comma-separated
//! remedy list. Loaded once at startup. A miss is not an error: the caller
//! shows "no remedies found" for an empty list.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemedyError {
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// Static condition → remedies table.
pub struct RemedyBook {
    entries: HashMap<String, Vec<String>>,
}

impl RemedyBook {
    /// Load the remedy CSV (`condition,remedies` with a header row).
    pub fn load(path: &Path) -> Result<Self, RemedyError> {
        let file = path.display().to_string();
        let wrap = |source: csv::Error| RemedyError::Csv {
            file: file.clone(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(wrap)?;
        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(wrap)?;
            let condition = record.get(0).unwrap_or_default().trim();
            let cell = record.get(1).unwrap_or_default();
            if condition.is_empty() {
                continue;
            }
            entries.insert(condition.to_lowercase(), split_remedies(cell));
        }
        Ok(Self { entries })
    }

    /// Build from in-memory rows (tests, fixtures).
    pub fn from_rows(rows: &[(&str, &str)]) -> Self {
        let entries = rows
            .iter()
            .map(|(condition, cell)| (condition.to_lowercase(), split_remedies(cell)))
            .collect();
        Self { entries }
    }

    /// Remedies for a condition; empty when the condition is unknown.
    pub fn remedies_for(&self, condition: &str) -> Vec<String> {
        self.entries
            .get(&condition.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

fn split_remedies(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|remedy| !remedy.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn splits_and_trims_remedy_cell() {
        let book = RemedyBook::from_rows(&[("Flu", "rest, warm fluids , honey,")]);
        assert_eq!(book.remedies_for("Flu"), vec!["rest", "warm fluids", "honey"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let book = RemedyBook::from_rows(&[("Common Cold", "steam inhalation")]);
        assert_eq!(book.remedies_for("common cold"), vec!["steam inhalation"]);
        assert_eq!(book.remedies_for(" COMMON COLD "), vec!["steam inhalation"]);
    }

    #[test]
    fn unknown_condition_returns_empty_list() {
        let book = RemedyBook::from_rows(&[("Flu", "rest")]);
        assert!(book.remedies_for("Dragon Pox").is_empty());
    }

    #[test]
    fn loads_from_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remedies.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"condition,remedies\nFlu,\"rest, warm fluids\"\nMigraine,dark room\n")
            .unwrap();

        let book = RemedyBook::load(&path).unwrap();
        assert_eq!(book.remedies_for("Flu"), vec!["rest", "warm fluids"]);
        assert_eq!(book.remedies_for("Migraine"), vec!["dark room"]);
        assert!(book.remedies_for("Dengue").is_empty());
    }
}
