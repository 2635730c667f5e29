//! Crawl runs: results reconciliation and fixtures refresh.
//!
//! One run drives one page from start to finish. Listing, pagination and
//! store failures abort the run; a failing match is logged and skipped, and
//! stays missing until a later run picks it up.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{AppConfig, CrawlConfig};
use crate::dataset::reconcile::existing_rows;
use crate::dataset::{
    DatasetKey, DatasetWriter, ReconcileMode, ReconcilePlan, SchemaNormalizer, StagingArea, Table,
    WriteOutcome,
};
use crate::scraper::fixtures::FixturesParser;
use crate::scraper::match_detail::extract_match;
use crate::scraper::match_list::MatchListParser;
use crate::scraper::pagination::expand_all;
use crate::scraper::{fixtures_url, results_url, Browser, PageAutomation, PageHost, MATCH_ROW};
use crate::storage::DatasetStore;

/// Summary of one results crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub filename: String,
    pub mode: ReconcileMode,
    /// Identifiers found on the expanded listing
    pub listed: usize,
    pub missing: usize,
    pub extracted: usize,
    pub failed: Vec<String>,
    /// `None` when nothing needed writing
    pub outcome: Option<WriteOutcome>,
    pub elapsed_secs: f64,
}

/// Summary of one fixtures crawl
#[derive(Debug, Clone, Serialize)]
pub struct FixturesReport {
    pub filename: String,
    pub fixtures: usize,
    pub outcome: WriteOutcome,
    pub elapsed_secs: f64,
}

/// Drives one page through a crawl run
pub struct Crawler<'a> {
    page: &'a dyn PageAutomation,
    store: &'a dyn DatasetStore,
    config: &'a CrawlConfig,
    staging: StagingArea,
}

impl<'a> Crawler<'a> {
    pub fn new(
        page: &'a dyn PageAutomation,
        store: &'a dyn DatasetStore,
        config: &'a CrawlConfig,
        staging: StagingArea,
    ) -> Self {
        Self {
            page,
            store,
            config,
            staging,
        }
    }

    async fn open_listing(&self, url: &str) -> Result<()> {
        let navigation = self
            .page
            .navigate(url)
            .await
            .with_context(|| format!("Failed to open {}", url))?;
        if !navigation.is_success() {
            bail!("{} returned status {:?}", url, navigation.status);
        }
        Ok(())
    }

    /// Snapshot of the current listing, empty when no match row shows up
    async fn listing_html(&self) -> Result<String> {
        match self.page.wait_for(MATCH_ROW, self.config.wait_timeout()).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => info!("Listing shows no matches"),
            Err(e) => return Err(e).context("Failed waiting for match rows"),
        }
        Ok(self.page.content().await?)
    }

    /// Stored dataset for `key`, read back through a staged local copy
    fn load_stored(&self, key: &DatasetKey) -> Result<Option<Table>> {
        let Some(doc) = self
            .store
            .find_by_key(key)
            .with_context(|| format!("Failed to look up dataset {}", key))?
        else {
            return Ok(None);
        };

        let staged = self.staging.stage(&doc.filename, &doc.file)?;
        let table = Table::from_path(staged.path())
            .with_context(|| format!("Failed to parse stored {}", doc.filename))?;
        Ok(Some(table))
    }

    /// Bring the dataset for `key` up to date with the results listing
    pub async fn crawl_results(&self, key: &DatasetKey) -> Result<CrawlReport> {
        let started = Instant::now();
        key.validate()?;
        let time = key.time.as_deref().context("Results datasets need a period")?;
        let normalizer = SchemaNormalizer::matches();

        let url = results_url(&self.config.base_url, &key.country, &key.tournament, &key.season);
        self.open_listing(&url).await?;

        let stored = self.load_stored(key)?;
        match stored {
            Some(ref table) => info!("Completing dataset {} ({} rows)", key, table.rows.len()),
            None => info!("Creating new dataset {}", key),
        }

        expand_all(self.page, self.config)
            .await
            .context("Failed to expand results listing")?;

        let match_ids = MatchListParser::parse(&self.listing_html().await?)?;
        let plan = ReconcilePlan::plan(stored.as_ref(), &match_ids);
        info!(
            "Listing has {} matches, {} stored, {} missing",
            plan.listed,
            plan.stored,
            plan.missing.len()
        );

        let mut report = CrawlReport {
            filename: key.filename(),
            mode: plan.mode,
            listed: plan.listed,
            missing: plan.missing.len(),
            extracted: 0,
            failed: Vec::new(),
            outcome: None,
            elapsed_secs: 0.0,
        };

        if plan.is_up_to_date() {
            info!("No matches missing from {}", key);
            report.elapsed_secs = started.elapsed().as_secs_f64();
            return Ok(report);
        }

        let mut rows = existing_rows(stored.as_ref(), &normalizer);
        let total = plan.missing.len();
        for (i, match_id) in plan.missing.iter().enumerate() {
            match extract_match(self.page, self.config, match_id, time).await {
                Ok(detail) => {
                    let record = normalizer.normalize(detail);
                    rows.push(normalizer.match_row(&record));
                    report.extracted += 1;
                }
                Err(e) => {
                    warn!("Skipping match {}: {:#}", match_id, e);
                    report.failed.push(match_id.clone());
                }
            }
            let done = i + 1;
            info!(
                "{} of {} - {:.2}%",
                done,
                total,
                done as f64 / total as f64 * 100.0
            );
        }

        if plan.mode == ReconcileMode::Delta && report.extracted == 0 {
            warn!("No missing match of {} could be extracted", key);
        } else {
            let table = Table::new(normalizer.columns(), rows);
            let writer = DatasetWriter::new(self.store, &self.staging);
            report.outcome = Some(writer.write(key, &table)?);
        }

        report.elapsed_secs = started.elapsed().as_secs_f64();
        info!(
            "Finished {} in {:.2} minutes",
            key,
            report.elapsed_secs / 60.0
        );
        Ok(report)
    }

    /// Replace the fixtures dataset for `key` with the current listing
    pub async fn crawl_fixtures(&self, key: &DatasetKey) -> Result<FixturesReport> {
        let started = Instant::now();
        key.validate()?;
        let normalizer = SchemaNormalizer::fixtures();

        let url = fixtures_url(&self.config.base_url, &key.country, &key.tournament, &key.season);
        self.open_listing(&url).await?;

        let fixtures = FixturesParser::parse(&self.listing_html().await?)?;
        info!("Found {} upcoming fixtures for {}", fixtures.len(), key);

        let rows = fixtures
            .iter()
            .map(|fixture| normalizer.fixture_row(fixture))
            .collect();
        let table = Table::new(normalizer.columns(), rows);
        let outcome = DatasetWriter::new(self.store, &self.staging).write(key, &table)?;

        Ok(FixturesReport {
            filename: key.filename(),
            fixtures: fixtures.len(),
            outcome,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}

/// Launch a browser, crawl results for `key` and close the browser
pub async fn run_results(
    config: &AppConfig,
    store: &dyn DatasetStore,
    key: &DatasetKey,
) -> Result<CrawlReport> {
    let browser = Browser::launch(&config.browser).await?;
    results_on(browser, config, store, key).await
}

/// Launch a browser, refresh fixtures for `key` and close the browser
pub async fn run_fixtures(
    config: &AppConfig,
    store: &dyn DatasetStore,
    key: &DatasetKey,
) -> Result<FixturesReport> {
    let browser = Browser::launch(&config.browser).await?;
    fixtures_on(browser, config, store, key).await
}

/// Crawl results on a page of `host`, closing `host` on every path
pub async fn results_on<H: PageHost>(
    host: H,
    config: &AppConfig,
    store: &dyn DatasetStore,
    key: &DatasetKey,
) -> Result<CrawlReport> {
    let result = async {
        let page = host.open_page(config.crawl.poll_interval()).await?;
        let staging = StagingArea::new(&config.storage.staging_dir);
        Crawler::new(&page, store, &config.crawl, staging)
            .crawl_results(key)
            .await
    }
    .await;

    let closed = host.close().await;
    info!("Browser closed");
    let report = result?;
    closed?;
    Ok(report)
}

/// Refresh fixtures on a page of `host`, closing `host` on every path
pub async fn fixtures_on<H: PageHost>(
    host: H,
    config: &AppConfig,
    store: &dyn DatasetStore,
    key: &DatasetKey,
) -> Result<FixturesReport> {
    let result = async {
        let page = host.open_page(config.crawl.poll_interval()).await?;
        let staging = StagingArea::new(&config.storage.staging_dir);
        Crawler::new(&page, store, &config.crawl, staging)
            .crawl_fixtures(key)
            .await
    }
    .await;

    let closed = host.close().await;
    let report = result?;
    closed?;
    Ok(report)
}
