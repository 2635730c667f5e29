//! Fixtures listing parser.
//!
//! URL: https://www.flashscore.com/football/COUNTRY/TOURNAMENT-SEASON/fixtures/

use scraper::Html;
use tracing::warn;

use super::dom::{contains, extract, select, ExtractError, Projection, Scope};
use super::MATCH_ROW;
use crate::dataset::record::FixtureRecord;

/// Marker carried by rows that are genuinely upcoming
pub const LIVE_BET: &str = "svg.liveBet";
pub const FIXTURE_TIME: &str = "div.event__time";
pub const FIXTURE_HOME: &str = "div.event__homeParticipant";
pub const FIXTURE_AWAY: &str = "div.event__awayParticipant";
pub const FIXTURE_HOME_LOGO: &str = "div.event__homeParticipant > img";
pub const FIXTURE_AWAY_LOGO: &str = "div.event__awayParticipant > img";

/// Parser for fixtures listing pages
pub struct FixturesParser;

impl FixturesParser {
    /// Parse every upcoming fixture row
    ///
    /// Rows without the live-bet marker are ignored; rows missing a field are
    /// logged and skipped.
    pub fn parse(html: &str) -> Result<Vec<FixtureRecord>, ExtractError> {
        let document = Html::parse_document(html);
        let mut fixtures = Vec::new();

        for row in select(Scope::Document(&document), MATCH_ROW)? {
            let scope = Scope::Element(row);
            if !contains(scope, LIVE_BET)? {
                continue;
            }

            match Self::parse_row(scope) {
                Ok(fixture) => fixtures.push(fixture),
                Err(e) => warn!("Skipping fixture row: {}", e),
            }
        }

        Ok(fixtures)
    }

    fn parse_row(row: Scope<'_>) -> Result<FixtureRecord, ExtractError> {
        Ok(FixtureRecord {
            date: extract(row, FIXTURE_TIME, Projection::Text)?,
            logo_home: extract(row, FIXTURE_HOME_LOGO, Projection::Attr("src"))?,
            logo_away: extract(row, FIXTURE_AWAY_LOGO, Projection::Attr("src"))?,
            home_team: extract(row, FIXTURE_HOME, Projection::Text)?,
            away_team: extract(row, FIXTURE_AWAY, Projection::Text)?,
        })
    }
}

#[cfg(test)]
pub(crate) mod sample {
    /// Fixture row; `live` adds the upcoming marker
    pub fn fixture_row(id: &str, date: &str, home: &str, away: &str, live: bool) -> String {
        let marker = if live {
            r#"<svg class="liveBet"></svg>"#
        } else {
            ""
        };
        format!(
            r#"<div class="event__match event__match--scheduled event__match--twoLine" id="g_1_{id}">
                <div class="event__time">{date}</div>
                <div class="event__homeParticipant"><img src="https://static.example/{home}.png">{home}</div>
                <div class="event__awayParticipant"><img src="https://static.example/{away}.png">{away}</div>
                {marker}
            </div>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::sample::fixture_row;
    use super::*;

    #[test]
    fn test_parse_fixtures() {
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            fixture_row("a1", "25.05. 16:00", "Arsenal", "Everton", true),
            fixture_row("a2", "25.05. 16:00", "Chelsea", "Fulham", false),
            fixture_row("a3", "26.05. 20:00", "Brentford", "Newcastle", true),
        );

        let fixtures = FixturesParser::parse(&html).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].date, "25.05. 16:00");
        assert_eq!(fixtures[0].home_team, "Arsenal");
        assert_eq!(fixtures[0].away_team, "Everton");
        assert_eq!(fixtures[0].logo_home, "https://static.example/Arsenal.png");
        assert_eq!(fixtures[1].home_team, "Brentford");
    }

    #[test]
    fn test_incomplete_row_skipped() {
        let broken = fixture_row("b1", "25.05. 16:00", "Arsenal", "Everton", true)
            .replace(r#"<div class="event__time">25.05. 16:00</div>"#, "");
        let html = format!(
            "<html><body>{}{}</body></html>",
            broken,
            fixture_row("b2", "26.05. 20:00", "Brentford", "Newcastle", true),
        );

        let fixtures = FixturesParser::parse(&html).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home_team, "Brentford");
    }

    #[test]
    fn test_empty_listing() {
        assert!(FixturesParser::parse("<html></html>").unwrap().is_empty());
    }
}
