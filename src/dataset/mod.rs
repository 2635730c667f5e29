//! Datasets: records, canonical schema, reconciliation and persistence.

pub mod reconcile;
pub mod record;
pub mod schema;
pub mod staging;
pub mod table;
pub mod writer;

pub use reconcile::{ReconcileMode, ReconcilePlan};
pub use schema::SchemaNormalizer;
pub use staging::StagingArea;
pub use table::Table;
pub use writer::{DatasetWriter, WriteOutcome};

use serde::Serialize;
use std::fmt;

/// Composite identity of a stored dataset
///
/// `time` is the statistics period; fixtures datasets have none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetKey {
    pub country: String,
    pub tournament: String,
    pub season: String,
    pub time: Option<String>,
}

impl DatasetKey {
    /// Key of a match results dataset
    pub fn matches(country: &str, tournament: &str, season: &str, time: &str) -> Self {
        Self {
            country: country.to_string(),
            tournament: tournament.to_string(),
            season: season.to_string(),
            time: Some(time.to_string()),
        }
    }

    /// Key of a fixtures dataset
    pub fn fixtures(country: &str, tournament: &str, season: &str) -> Self {
        Self {
            country: country.to_string(),
            tournament: tournament.to_string(),
            season: season.to_string(),
            time: None,
        }
    }

    /// Reject components that are empty or could act as path segments
    pub fn validate(&self) -> Result<(), InvalidKey> {
        let mut fields = vec![
            ("country", self.country.as_str()),
            ("tournament", self.tournament.as_str()),
            ("season", self.season.as_str()),
        ];
        if let Some(time) = self.time.as_deref() {
            fields.push(("time", time));
        }

        for (field, value) in fields {
            let unsafe_chars = value.contains(|c: char| c == '/' || c == '\\');
            if value.trim().is_empty() || unsafe_chars || value.contains("..") {
                return Err(InvalidKey {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Stored filename, also the upsert lookup key
    pub fn filename(&self) -> String {
        format!(
            "{}-{}-{}.csv",
            self.tournament,
            self.season,
            self.time.as_deref().unwrap_or("")
        )
    }
}

/// A dataset key component that cannot be used
#[derive(Debug, thiserror::Error)]
#[error("invalid {field} `{value}`")]
pub struct InvalidKey {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.filename())
    }
}
