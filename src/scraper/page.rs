//! Page automation seam.
//!
//! The crawl engine drives a page only through [`PageAutomation`]; the
//! chromiumoxide implementation lives in [`super::browser`].

use async_trait::async_trait;
use std::time::Duration;

/// Errors raised while driving a page
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("element `{0}` not found")]
    NotFound(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl PageError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PageError::Timeout { .. })
    }
}

/// Outcome of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// HTTP status of the main document, when the browser reports one
    pub status: Option<u16>,
}

impl Navigation {
    /// Whether the main document loaded with a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |s| (200..300).contains(&s))
    }
}

/// Capability to drive one rendered page
#[async_trait]
pub trait PageAutomation: Send + Sync {
    /// Navigate to `url` and wait for the document to load
    async fn navigate(&self, url: &str) -> Result<Navigation, PageError>;

    /// Wait until `selector` matches at least one element
    ///
    /// Returns [`PageError::Timeout`] when nothing matched within `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<(), PageError>;

    /// Serialized HTML of the current document
    async fn content(&self) -> Result<String, PageError>;
}

/// Owner of the page a crawl run drives
///
/// `close` consumes the host; callers close it whether or not the run failed.
#[async_trait]
pub trait PageHost: Send + Sync + Sized {
    type Page: PageAutomation;

    async fn open_page(&self, poll_interval: Duration) -> anyhow::Result<Self::Page>;

    async fn close(self) -> anyhow::Result<()>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_success() {
        assert!(Navigation { status: Some(200) }.is_success());
        assert!(Navigation { status: None }.is_success());
        assert!(!Navigation { status: Some(404) }.is_success());
        assert!(!Navigation { status: Some(500) }.is_success());
    }

    #[test]
    fn test_timeout_classification() {
        let timeout = PageError::Timeout {
            selector: "a.event__more".to_string(),
            waited: Duration::from_secs(1),
        };
        assert!(timeout.is_timeout());
        assert!(!PageError::Browser("closed".to_string()).is_timeout());
    }
}
