//! Web scraper module for flashscore.com
//!
//! Provides browser automation, DOM snapshot extraction, pagination and the
//! match list, match detail and fixtures extractors.

pub mod browser;
pub mod dom;
pub mod fixtures;
pub mod match_detail;
pub mod match_list;
pub mod page;
pub mod pagination;

pub use browser::Browser;
pub use page::{PageAutomation, PageHost};

/// Base URL for flashscore.com
pub const BASE_URL: &str = "https://www.flashscore.com";

/// "Show more matches" affordance on results listings
pub const SHOW_MORE: &str = "a.event__more";
/// One rendered match row on results and fixtures listings
pub const MATCH_ROW: &str = "div.event__match--twoLine";
/// Prefix of a match row's id attribute
pub const MATCH_ID_PREFIX: &str = "g_1_";

/// Build results listing URL
pub fn results_url(base_url: &str, country: &str, tournament: &str, season: &str) -> String {
    format!(
        "{}/football/{}/{}-{}/results/",
        base_url, country, tournament, season
    )
}

/// Build fixtures listing URL
pub fn fixtures_url(base_url: &str, country: &str, tournament: &str, season: &str) -> String {
    format!(
        "{}/football/{}/{}-{}/fixtures/",
        base_url, country, tournament, season
    )
}

/// Build match statistics URL for one period
pub fn match_url(base_url: &str, match_id: &str, time: &str) -> String {
    format!(
        "{}/match/{}/#/match-summary/match-statistics/{}",
        base_url, match_id, time
    )
}
