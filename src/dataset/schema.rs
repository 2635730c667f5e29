//! Canonical dataset columns and statistic label normalization.
//!
//! Statistic labels are abbreviated to the first character of each word
//! ("Ball Possession" -> `BP`) and stored under `<abbrev>HT` / `<abbrev>AT`.
//! Only abbreviations with a canonical column pair are kept.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::record::{FixtureRecord, MatchDetail, MatchRecord, StatisticValue};

/// Value written for absent or empty cells
pub const PLACEHOLDER: &str = "-";

pub const HOME_SUFFIX: &str = "HT";
pub const AWAY_SUFFIX: &str = "AT";

/// Column order of match datasets
pub const MATCH_COLUMNS: [&str; 41] = [
    "Match_ID", "Round", "Date", "LogoHome", "LogoAway", "HomeTeam", "AwayTeam", "FTHG", "FTAG",
    "EGHT", "EGAT", "BPHT", "BPAT", "GAHT", "GAAT", "SoGHT", "SoGAT", "FKHT", "FKAT", "CKHT",
    "CKAT", "OHT", "OAT", "THT", "TAT", "GSHT", "GSAT", "FHT", "FAT", "RCHT", "RCAT", "YCHT",
    "YCAT", "TPHT", "TPAT", "AHT", "AAT", "DAHT", "DAAT", "CCHT", "CCAT",
];

/// Column order of fixtures datasets
pub const FIXTURE_COLUMNS: [&str; 7] = [
    "Match_ID", "Round", "Date", "LogoHome", "LogoAway", "HomeTeam", "AwayTeam",
];

fn qualifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

/// Abbreviate a statistic label
///
/// Parenthesised qualifiers are dropped first, so "Expected Goals (xG)" gives `EG`.
pub fn abbreviate(label: &str) -> String {
    let stripped = qualifier_re().replace_all(label, " ");
    stripped
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Column pair for a statistic label
pub fn statistic_columns(label: &str) -> (String, String) {
    let abbrev = abbreviate(label);
    (
        format!("{}{}", abbrev, HOME_SUFFIX),
        format!("{}{}", abbrev, AWAY_SUFFIX),
    )
}

fn cell(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Maps records onto a fixed column list
#[derive(Debug, Clone, Copy)]
pub struct SchemaNormalizer {
    columns: &'static [&'static str],
}

impl SchemaNormalizer {
    /// Normalizer for match datasets
    pub fn matches() -> Self {
        Self {
            columns: &MATCH_COLUMNS,
        }
    }

    /// Normalizer for fixtures datasets
    pub fn fixtures() -> Self {
        Self {
            columns: &FIXTURE_COLUMNS,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn is_canonical(&self, column: &str) -> bool {
        self.columns.iter().any(|c| *c == column)
    }

    /// Turn a raw match detail into a record holding canonical statistics only
    pub fn normalize(&self, detail: MatchDetail) -> MatchRecord {
        let mut statistics = BTreeMap::new();
        let mut sources: HashMap<String, String> = HashMap::new();

        for stat in detail.statistics {
            let abbrev = abbreviate(&stat.label);
            let (home_col, away_col) = statistic_columns(&stat.label);
            if !self.is_canonical(&home_col) || !self.is_canonical(&away_col) {
                debug!(
                    "Dropping statistic '{}' of match {}: no column {}",
                    stat.label, detail.match_id, home_col
                );
                continue;
            }

            if let Some(previous) = sources.get(&abbrev) {
                if previous != &stat.label {
                    warn!(
                        "Match {}: '{}' and '{}' both map to {}/{}; keeping '{}'",
                        detail.match_id, previous, stat.label, home_col, away_col, stat.label
                    );
                }
            }
            sources.insert(abbrev.clone(), stat.label);
            statistics.insert(
                abbrev,
                StatisticValue {
                    home: stat.home,
                    away: stat.away,
                },
            );
        }

        MatchRecord {
            match_id: detail.match_id,
            round: detail.round,
            date: detail.date,
            logo_home: detail.logo_home,
            logo_away: detail.logo_away,
            home_team: detail.home_team,
            away_team: detail.away_team,
            fthg: detail.fthg,
            ftag: detail.ftag,
            statistics,
        }
    }

    /// Render a match record in column order
    pub fn match_row(&self, record: &MatchRecord) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                if let Some(value) = record.fixed_field(column) {
                    return cell(Some(value));
                }
                let value = if let Some(abbrev) = column.strip_suffix(HOME_SUFFIX) {
                    record.statistics.get(abbrev).map(|v| v.home.as_str())
                } else if let Some(abbrev) = column.strip_suffix(AWAY_SUFFIX) {
                    record.statistics.get(abbrev).map(|v| v.away.as_str())
                } else {
                    None
                };
                cell(value)
            })
            .collect()
    }

    /// Render a fixture in column order
    pub fn fixture_row(&self, fixture: &FixtureRecord) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| cell(fixture.field(column)))
            .collect()
    }

    /// Re-project a row read under `header` onto the canonical columns
    ///
    /// Columns unknown to the schema are dropped, missing ones become placeholders.
    pub fn project(&self, header: &[String], row: &[String]) -> Vec<String> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        self.columns
            .iter()
            .map(|column| {
                let value = positions
                    .get(column)
                    .and_then(|&i| row.get(i))
                    .map(String::as_str);
                cell(value)
            })
            .collect()
    }
}
