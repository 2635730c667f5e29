//! Browser automation using chromiumoxide.

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::page::{Navigation, PageAutomation, PageError, PageHost};
use crate::config::BrowserConfig;

/// Status of the main document, when the Navigation Timing API reports one
const NAVIGATION_STATUS_JS: &str = r#"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && entry.responseStatus ? entry.responseStatus : null;
})()"#;

fn browser_error(e: impl std::fmt::Display) -> PageError {
    PageError::Browser(e.to_string())
}

/// Status from the evaluated navigation entry; JS `null` arrives as no value
fn navigation_status(value: Option<&serde_json::Value>) -> Result<Option<u16>, PageError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().map(|f| f as u64))
            .and_then(|s| u16::try_from(s).ok())
            .map(Some)
            .ok_or_else(|| PageError::Browser(format!("unexpected navigation status {}", v))),
    }
}

/// Browser wrapper for one crawl run
pub struct Browser {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
}

impl Browser {
    /// Launch a new headless browser instance
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let chrome_config = ChromeConfig::builder()
            .chrome_executable(config.executable_path())
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .window_size(config.window_width, config.window_height)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = ChromeBrowser::launch(chrome_config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to launch browser: {}", e))?;

        // Spawn handler task - must keep running for browser to work
        let handle = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => continue, // Don't break on errors
                    None => break,
                }
            }
        });

        Ok(Self { browser, handle })
    }
}

#[async_trait]
impl PageHost for Browser {
    type Page = ChromePage;

    /// Open a blank page
    async fn open_page(&self, poll_interval: Duration) -> Result<ChromePage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create new page: {}", e))?;

        Ok(ChromePage {
            page,
            poll_interval,
        })
    }

    /// Close the browser
    async fn close(mut self) -> Result<()> {
        let _ = self.browser.close().await;
        self.handle.abort();
        debug!("Browser closed");
        Ok(())
    }
}

/// A live chromium tab
pub struct ChromePage {
    page: Page,
    poll_interval: Duration,
}

impl ChromePage {
    async fn selector_present(&self, selector: &str) -> Result<bool, PageError> {
        let literal = serde_json::to_string(selector).map_err(browser_error)?;
        let expr = format!("document.querySelector({}) !== null", literal);
        self.page
            .evaluate(expr)
            .await
            .map_err(browser_error)?
            .into_value::<bool>()
            .map_err(browser_error)
    }
}

#[async_trait]
impl PageAutomation for ChromePage {
    async fn navigate(&self, url: &str) -> Result<Navigation, PageError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let result = self
            .page
            .evaluate(NAVIGATION_STATUS_JS)
            .await
            .map_err(browser_error)?;
        let status = navigation_status(result.value())?;

        Ok(Navigation { status })
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.selector_present(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<(), PageError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| PageError::NotFound(selector.to_string()))?;
        element.click().await.map_err(browser_error)?;
        Ok(())
    }

    async fn content(&self) -> Result<String, PageError> {
        self.page.content().await.map_err(browser_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_status_is_unknown() {
        assert_eq!(navigation_status(None).unwrap(), None);
        assert_eq!(navigation_status(Some(&json!(null))).unwrap(), None);
    }

    #[test]
    fn test_reported_status() {
        assert_eq!(navigation_status(Some(&json!(200))).unwrap(), Some(200));
        assert_eq!(navigation_status(Some(&json!(404.0))).unwrap(), Some(404));
        assert!(navigation_status(Some(&json!("ok"))).is_err());
    }
}
