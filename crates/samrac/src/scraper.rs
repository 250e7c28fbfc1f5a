use crate::parser::{latest_post, ParseError};
use crate::types::Post;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Source of the site's front page markup. `WebScraper` is the live
/// implementation; tests substitute canned documents.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_front_page(&self) -> Result<String, ScraperError>;
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_base_url(crate::BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the front page and parse out the most recent post.
    pub async fn fetch_latest_post(&self) -> Result<Post, ScraperError> {
        let html = self.fetch_front_page().await?;
        let post = latest_post(&html)?;
        Ok(post)
    }
}

#[async_trait]
impl PageSource for WebScraper {
    async fn fetch_front_page(&self) -> Result<String, ScraperError> {
        let html = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }
}
