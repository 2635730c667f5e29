//! Match and fixture records.

use std::collections::BTreeMap;

/// One statistic row as displayed on a match page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticRow {
    pub label: String,
    pub home: String,
    pub away: String,
}

/// Raw extraction result for one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetail {
    pub match_id: String,
    pub round: String,
    pub date: String,
    pub logo_home: String,
    pub logo_away: String,
    pub home_team: String,
    pub away_team: String,
    pub fthg: String,
    pub ftag: String,
    pub statistics: Vec<StatisticRow>,
}

/// Home and away value of one statistic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticValue {
    pub home: String,
    pub away: String,
}

/// Normalized match record
///
/// Statistics are keyed by abbreviation (`BP` for "Ball Possession") and only
/// hold those with a canonical column pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: String,
    pub round: String,
    pub date: String,
    pub logo_home: String,
    pub logo_away: String,
    pub home_team: String,
    pub away_team: String,
    pub fthg: String,
    pub ftag: String,
    pub statistics: BTreeMap<String, StatisticValue>,
}

impl MatchRecord {
    /// Value for a fixed column name, if it is one
    pub fn fixed_field(&self, column: &str) -> Option<&str> {
        let value = match column {
            "Match_ID" => &self.match_id,
            "Round" => &self.round,
            "Date" => &self.date,
            "LogoHome" => &self.logo_home,
            "LogoAway" => &self.logo_away,
            "HomeTeam" => &self.home_team,
            "AwayTeam" => &self.away_team,
            "FTHG" => &self.fthg,
            "FTAG" => &self.ftag,
            _ => return None,
        };
        Some(value)
    }
}

/// Upcoming match on a fixtures listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRecord {
    pub date: String,
    pub logo_home: String,
    pub logo_away: String,
    pub home_team: String,
    pub away_team: String,
}

impl FixtureRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        let value = match column {
            "Date" => &self.date,
            "LogoHome" => &self.logo_home,
            "LogoAway" => &self.logo_away,
            "HomeTeam" => &self.home_team,
            "AwayTeam" => &self.away_team,
            _ => return None,
        };
        Some(value)
    }
}
