//! Match list extraction from an expanded results listing.

use scraper::Html;

use super::dom::{extract_all, ExtractError, Projection, Scope};
use super::{MATCH_ID_PREFIX, MATCH_ROW};

/// Parser for results listing pages
pub struct MatchListParser;

impl MatchListParser {
    /// Parse listing HTML and extract match identifiers
    ///
    /// Keeps document order and does not deduplicate.
    pub fn parse(html: &str) -> Result<Vec<String>, ExtractError> {
        let document = Html::parse_document(html);
        let raw_ids = extract_all(Scope::Document(&document), MATCH_ROW, Projection::Attr("id"))?;

        let match_ids = raw_ids
            .into_iter()
            .map(|raw| match raw.strip_prefix(MATCH_ID_PREFIX) {
                Some(id) => id.to_string(),
                None => raw,
            })
            .filter(|id| !id.is_empty())
            .collect();

        Ok(match_ids)
    }
}
