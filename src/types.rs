//! Response types for the flashstat API.

use serde::Serialize;

use crate::crawler::{CrawlReport, FixturesReport};
use crate::storage::DatasetDocument;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Results crawl response
#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub message: String,
    pub report: CrawlReport,
}

/// Fixtures crawl response
#[derive(Debug, Serialize)]
pub struct FixturesResponse {
    pub message: String,
    pub report: FixturesReport,
}

/// Dataset listing entry, without the blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub id: i64,
    pub filename: String,
    pub country: String,
    pub tournament: String,
    pub season: String,
    pub time: Option<String>,
    pub created_at: Option<String>,
}

impl From<DatasetDocument> for DatasetSummary {
    fn from(doc: DatasetDocument) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename,
            country: doc.country,
            tournament: doc.tournament,
            season: doc.season,
            time: doc.time,
            created_at: doc.created_at,
        }
    }
}
