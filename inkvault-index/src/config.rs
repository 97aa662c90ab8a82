//! Indexer configuration and per-query options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for [`ClientIndexer`](crate::ClientIndexer).
///
/// Loaded from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Upper bound on a single document fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Results returned when a query does not set its own limit.
    pub max_results: usize,
    pub title_weight: f64,
    pub text_weight: f64,
    pub tags_weight: f64,
    pub folder_weight: f64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 30_000,
            max_results: 50,
            title_weight: 3.0,
            text_weight: 1.0,
            tags_weight: 2.0,
            folder_weight: 1.0,
        }
    }
}

impl IndexerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn weight(&self, field: SearchField) -> f64 {
        match field {
            SearchField::Title => self.title_weight,
            SearchField::Text => self.text_weight,
            SearchField::Tags => self.tags_weight,
            SearchField::Folder => self.folder_weight,
        }
    }
}

/// A searchable document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Text,
    Tags,
    Folder,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [Self::Title, Self::Text, Self::Tags, Self::Folder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::Tags => "tags",
            Self::Folder => "folder",
        }
    }
}

impl std::fmt::Display for SearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "text" => Ok(Self::Text),
            "tags" | "tag" => Ok(Self::Tags),
            "folder" => Ok(Self::Folder),
            other => Err(format!("unknown search field: {other}")),
        }
    }
}

/// Per-query options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Fields to match against. Empty means all fields.
    pub fields: Vec<SearchField>,
    /// Overrides [`IndexerConfig::max_results`].
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: SearchField::ALL.to_vec(),
            limit: None,
        }
    }
}

impl SearchOptions {
    pub fn fields(fields: impl Into<Vec<SearchField>>) -> Self {
        Self {
            fields: fields.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn active_fields(&self) -> Vec<SearchField> {
        if self.fields.is_empty() {
            return SearchField::ALL.to_vec();
        }
        SearchField::ALL
            .into_iter()
            .filter(|f| self.fields.contains(f))
            .collect()
    }

    /// Whether answering this query needs document bodies decrypted.
    pub(crate) fn needs_body(&self) -> bool {
        self.active_fields().contains(&SearchField::Text)
    }
}
