//! CSV rendering and parsing of dataset blobs.

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Header plus string rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            header: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Render as comma-separated text with `\n` line endings
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV: {}", e.error()))
    }

    /// Parse CSV text whose first line is the header
    ///
    /// Short rows are accepted as is; callers re-project them.
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let header = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, _>>()
            .context("Failed to read CSV rows")?;

        Ok(Self { header, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_csv(&bytes)
    }

    /// Rows as JSON objects keyed by header name
    pub fn to_json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.header
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value = row
                            .get(i)
                            .map(|v| Value::String(v.clone()))
                            .unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::record::{MatchDetail, StatisticRow};
    use crate::dataset::schema::{SchemaNormalizer, MATCH_COLUMNS, PLACEHOLDER};

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_render_format() {
        let table = Table::new(&["Match_ID", "Round"], vec![row(&["a", "Round 1"]), row(&["b", "-"])]);
        let text = String::from_utf8(table.to_csv().unwrap()).unwrap();
        assert_eq!(text, "Match_ID,Round\na,Round 1\nb,-\n");
    }

    #[test]
    fn test_header_only() {
        let table = Table::new(&["Match_ID", "Round"], Vec::new());
        let bytes = table.to_csv().unwrap();
        let parsed = Table::from_csv(&bytes).unwrap();
        assert_eq!(parsed.header, vec!["Match_ID", "Round"]);
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_round_trip_match_rows() {
        let normalizer = SchemaNormalizer::matches();
        let detail = MatchDetail {
            match_id: "KjB8xQ1c".to_string(),
            round: "Round 38".to_string(),
            date: "19.05.2024".to_string(),
            logo_home: "https://static.example/a.png".to_string(),
            logo_away: "https://static.example/b.png".to_string(),
            home_team: "Brighton & Hove, Albion".to_string(),
            away_team: "Everton".to_string(),
            fthg: "2".to_string(),
            ftag: "1".to_string(),
            statistics: vec![StatisticRow {
                label: "Ball Possession".to_string(),
                home: "64%".to_string(),
                away: "36%".to_string(),
            }],
        };
        let rows = vec![normalizer.match_row(&normalizer.normalize(detail))];
        let table = Table::new(&MATCH_COLUMNS, rows.clone());

        let parsed = Table::from_csv(&table.to_csv().unwrap()).unwrap();
        assert_eq!(parsed.header.len(), MATCH_COLUMNS.len());
        assert_eq!(parsed.rows, rows);
        assert!(parsed.rows[0].iter().all(|v| !v.is_empty()));
        assert_eq!(parsed.rows[0][5], "Brighton & Hove, Albion");
        assert_eq!(parsed.rows[0][9], PLACEHOLDER);
    }

    #[test]
    fn test_parse_unterminated_last_line() {
        let parsed = Table::from_csv(b"Match_ID,Round\na,Round 1\nb,Round 2").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1], row(&["b", "Round 2"]));
    }

    #[test]
    fn test_json_rows() {
        let table = Table::new(&["Match_ID", "Round"], vec![row(&["a", "Round 1"])]);
        let json = table.to_json_rows();
        assert_eq!(json.len(), 1);
        assert_eq!(json[0]["Match_ID"], "a");
        assert_eq!(json[0]["Round"], "Round 1");
    }
}
