//! Best-effort condition descriptions.
//!
//! Looks up a two-sentence summary per disease name from the Wikipedia REST
//! API, behind a process-wide cache so repeat conditions never hit the
//! network twice. Every failure mode (missing page, disambiguation, network
//! fault, timeout) falls back to a templated description; enrichment never
//! aborts the ranking flow.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("description request failed: {0}")]
    Http(String),

    #[error("description request timed out")]
    Timeout,

    #[error("description lookup returned HTTP {0}")]
    Status(u16),

    #[error("description response was not parseable: {0}")]
    Parse(String),

    #[error("'{0}' is a disambiguation page")]
    Disambiguation(String),

    #[error("no summary text for '{0}'")]
    Empty(String),
}

/// Source of short disease summaries. The production implementation talks
/// to Wikipedia; tests inject fakes to observe cache behavior.
pub trait DescriptionSource: Send + Sync {
    fn summary(&self, name: &str) -> Result<String, DescriptionError>;
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type")]
    page_type: Option<String>,
    extract: Option<String>,
}

/// Wikipedia REST `page/summary` client with a bounded request timeout.
pub struct WikipediaSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl WikipediaSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DescriptionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DescriptionError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl DescriptionSource for WikipediaSource {
    fn summary(&self, name: &str) -> Result<String, DescriptionError> {
        let title = name.replace(' ', "_");
        let url = format!("{}/api/rest_v1/page/summary/{title}", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                DescriptionError::Timeout
            } else {
                DescriptionError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DescriptionError::Status(status.as_u16()));
        }

        let parsed: SummaryResponse = response
            .json()
            .map_err(|e| DescriptionError::Parse(e.to_string()))?;

        if parsed.page_type.as_deref() == Some("disambiguation") {
            return Err(DescriptionError::Disambiguation(name.to_string()));
        }

        match parsed.extract {
            Some(extract) if !extract.trim().is_empty() => {
                Ok(first_sentences(extract.trim(), 2))
            }
            _ => Err(DescriptionError::Empty(name.to_string())),
        }
    }
}

/// Truncate text to its first `n` sentences.
fn first_sentences(text: &str, n: usize) -> String {
    text.split_inclusive(". ")
        .take(n)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Cached description lookup. One instance lives for the process lifetime;
/// the cache mutex makes concurrent request handlers safe.
pub struct DescriptionProvider {
    source: Box<dyn DescriptionSource>,
    cache: Mutex<HashMap<String, String>>,
}

impl DescriptionProvider {
    pub fn new(source: Box<dyn DescriptionSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A short description for the disease. Infallible: cache hit, source
    /// lookup, or templated fallback, in that order. The fallback is not
    /// cached so a transient fault doesn't pin the template forever.
    pub fn describe(&self, disease: &str) -> String {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(disease) {
                return hit.clone();
            }
        }

        match self.source.summary(disease) {
            Ok(text) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(disease.to_string(), text.clone());
                }
                text
            }
            Err(err) => {
                tracing::debug!(disease, %err, "description lookup failed, using fallback");
                fallback_description(disease)
            }
        }
    }
}

pub fn fallback_description(disease: &str) -> String {
    format!("Based on your symptoms, you may be experiencing {disease}.")
}
