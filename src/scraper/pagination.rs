//! "Show more" pagination expansion for results listings.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::page::PageAutomation;
use super::SHOW_MORE;
use crate::config::CrawlConfig;

/// Whether the "show more" affordance is currently rendered
///
/// A timeout is the expected answer once the listing is exhausted; every
/// other page error is returned as is.
pub async fn affordance_present(page: &dyn PageAutomation, config: &CrawlConfig) -> Result<bool> {
    match page.wait_for(SHOW_MORE, config.pagination_timeout()).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => Ok(false),
        Err(e) => Err(e).context("probing for the show-more affordance"),
    }
}

/// Click "show more" until it stops appearing
///
/// Returns the number of clicks performed; an already expanded listing yields 0.
pub async fn expand_all(page: &dyn PageAutomation, config: &CrawlConfig) -> Result<usize> {
    let mut clicks = 0;

    while affordance_present(page, config).await? {
        page.click(SHOW_MORE)
            .await
            .context("clicking the show-more affordance")?;
        clicks += 1;
        debug!("Expanded listing ({} clicks)", clicks);
        tokio::time::sleep(config.click_settle()).await;
    }

    info!("Listing fully expanded after {} clicks", clicks);
    Ok(clicks)
}
