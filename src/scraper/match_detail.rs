//! Match detail extraction.
//!
//! URL: https://www.flashscore.com/match/MATCHID/#/match-summary/match-statistics/TIME

use anyhow::{bail, Context, Result};
use scraper::Html;
use tracing::{debug, warn};

use super::dom::{element_lines, extract, first, select, ExtractError, Projection, Scope};
use super::match_url;
use super::page::PageAutomation;
use crate::config::CrawlConfig;
use crate::dataset::record::{MatchDetail, StatisticRow};

pub const ROUND: &str = "span.tournamentHeader__country";
pub const HOME_TEAM: &str = "div.duelParticipant__home";
pub const AWAY_TEAM: &str = "div.duelParticipant__away";
pub const HOME_LOGO: &str = "#detail > div.duelParticipant > div.duelParticipant__home > a > img";
pub const AWAY_LOGO: &str = "#detail > div.duelParticipant > div.duelParticipant__away > a > img";
pub const SCORE: &str = "div.detailScore__wrapper";
pub const START_TIME: &str = "div.duelParticipant__startTime";
pub const STAT_ROW: &str = "div._row_1nw75_8";
pub const STAT_LABEL: &str = "div._category_1ague_4";
pub const STAT_HOME: &str = "div._homeValue_1jbkc_9";
pub const STAT_AWAY: &str = "div._awayValue_1jbkc_13";

/// Elements every match page must render before it is read
pub const REQUIRED_SELECTORS: [&str; 7] = [
    ROUND, HOME_TEAM, AWAY_TEAM, HOME_LOGO, AWAY_LOGO, SCORE, START_TIME,
];

/// Parser for match statistics pages
pub struct MatchDetailParser;

impl MatchDetailParser {
    /// Parse a rendered match page
    pub fn parse(html: &str, match_id: &str) -> Result<MatchDetail, ExtractError> {
        let document = Html::parse_document(html);
        let doc = Scope::Document(&document);

        let round = Self::parse_round(&extract(doc, ROUND, Projection::Text)?);
        let home_team = extract(doc, HOME_TEAM, Projection::Text)?;
        let away_team = extract(doc, AWAY_TEAM, Projection::Text)?;
        let logo_home = extract(doc, HOME_LOGO, Projection::Attr("src"))?;
        let logo_away = extract(doc, AWAY_LOGO, Projection::Attr("src"))?;
        let (fthg, ftag) = Self::parse_score(&element_lines(first(doc, SCORE)?))?;
        let date = Self::parse_date(&extract(doc, START_TIME, Projection::Text)?)?;
        let statistics = Self::parse_statistics(doc)?;

        Ok(MatchDetail {
            match_id: match_id.to_string(),
            round,
            date,
            logo_home,
            logo_away,
            home_team,
            away_team,
            fthg,
            ftag,
            statistics,
        })
    }

    /// Last segment of a breadcrumb such as "ENGLAND: Premier League - Round 38"
    pub fn parse_round(text: &str) -> String {
        text.rsplit(" - ").next().unwrap_or_default().trim().to_string()
    }

    /// Split a score block ("2\n-\n1" or "2-1") into home and away goals
    pub fn parse_score(text: &str) -> Result<(String, String), ExtractError> {
        let parts: Vec<&str> = text.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [home, away] if !home.is_empty() && !away.is_empty() => {
                Ok((home.to_string(), away.to_string()))
            }
            _ => Err(ExtractError::Malformed {
                field: "score",
                value: text.to_string(),
            }),
        }
    }

    /// First whitespace-delimited token of a start time such as "15.03.2024 20:00"
    pub fn parse_date(text: &str) -> Result<String, ExtractError> {
        text.split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| ExtractError::Malformed {
                field: "start time",
                value: text.to_string(),
            })
    }

    fn parse_statistics(doc: Scope<'_>) -> Result<Vec<StatisticRow>, ExtractError> {
        let mut statistics = Vec::new();

        for row in select(doc, STAT_ROW)? {
            let scope = Scope::Element(row);
            let parsed = (|| {
                Ok::<_, ExtractError>(StatisticRow {
                    label: extract(scope, STAT_LABEL, Projection::Text)?,
                    home: extract(scope, STAT_HOME, Projection::Text)?,
                    away: extract(scope, STAT_AWAY, Projection::Text)?,
                })
            })();

            match parsed {
                Ok(stat) => statistics.push(stat),
                Err(e) => warn!("Skipping statistic row: {}", e),
            }
        }

        Ok(statistics)
    }
}

/// Navigate to one match and extract its detail
///
/// Any error here concerns this match only; callers skip it and move on.
pub async fn extract_match(
    page: &dyn PageAutomation,
    config: &CrawlConfig,
    match_id: &str,
    time: &str,
) -> Result<MatchDetail> {
    let url = match_url(&config.base_url, match_id, time);
    let navigation = page
        .navigate(&url)
        .await
        .with_context(|| format!("opening match {}", match_id))?;
    if !navigation.is_success() {
        bail!(
            "match {} returned status {:?}",
            match_id,
            navigation.status
        );
    }

    for selector in REQUIRED_SELECTORS {
        page.wait_for(selector, config.wait_timeout())
            .await
            .with_context(|| format!("match {}: waiting for {}", match_id, selector))?;
    }

    match page.wait_for(STAT_ROW, config.statistics_timeout()).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => debug!("Match {} has no statistics rows", match_id),
        Err(e) => return Err(e).with_context(|| format!("match {}: statistics", match_id)),
    }

    let html = page.content().await?;
    let detail = MatchDetailParser::parse(&html, match_id)
        .with_context(|| format!("parsing match {}", match_id))?;

    Ok(detail)
}
