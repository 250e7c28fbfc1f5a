use crate::notify::{Notifier, NotifyError};
use crate::parser::{latest_post, ParseError};
use crate::scraper::{PageSource, ScraperError};
use crate::store::{MarkerStore, StoreError};
use crate::types::MonthDay;

use serde::Serialize;

pub const DEFAULT_KEYWORD: &str = "mocha chip";
pub const DEFAULT_MESSAGE: &str = "mocha chip!";

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] ScraperError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Marker store error: {0}")]
    Store(#[from] StoreError),
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// How a single check ended. Only `Notified` published a message and
/// moved the marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Notified,
    AlreadyNotified,
    NoPostForToday,
    KeywordMissing,
}

impl CheckOutcome {
    pub fn notified(&self) -> bool {
        matches!(self, CheckOutcome::Notified)
    }
}

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub topic_arn: String,
    pub message: String,
    pub keyword: String,
}

impl CheckerConfig {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            message: DEFAULT_MESSAGE.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Checks the front page once and notifies at most once per day.
pub struct DailyChecker {
    page: Box<dyn PageSource>,
    store: Box<dyn MarkerStore>,
    notifier: Box<dyn Notifier>,
    config: CheckerConfig,
}

impl DailyChecker {
    pub fn new(
        page: Box<dyn PageSource>,
        store: Box<dyn MarkerStore>,
        notifier: Box<dyn Notifier>,
        config: CheckerConfig,
    ) -> Self {
        Self {
            page,
            store,
            notifier,
            config,
        }
    }

    /// Run one check for the current local day.
    pub async fn run(&self) -> Result<CheckOutcome, CheckError> {
        self.run_for_day(MonthDay::today()).await
    }

    /// Invariant: the marker is written only after a successful publish,
    /// so it never gets ahead of the notifications actually sent. The
    /// reverse can happen: a crash between publish and write leaves the
    /// marker stale and a rerun may notify twice.
    pub async fn run_for_day(&self, today: MonthDay) -> Result<CheckOutcome, CheckError> {
        let last = self.store.read_marker().await?;
        match &last {
            Some(day) => log::info!("Last notified day: {}", day),
            None => log::info!("No marker found; never notified before"),
        }

        if last.as_deref() == Some(today.as_str()) {
            log::info!("Already notified for {}; skipping fetch", today);
            return Ok(CheckOutcome::AlreadyNotified);
        }

        let html = self.page.fetch_front_page().await?;
        let post = latest_post(&html)?;
        log::info!("Top post: {}", post.title);

        if !post.is_for_day(&today) {
            log::info!("Top post is not for {}", today);
            return Ok(CheckOutcome::NoPostForToday);
        }

        if !post.has_keyword(&self.config.keyword) {
            log::info!("No mention of {:?} in today's post", self.config.keyword);
            return Ok(CheckOutcome::KeywordMissing);
        }

        let message = format!("{}: {}", today, self.config.message);
        log::info!("Publishing to {}", self.config.topic_arn);
        self.notifier
            .publish(&self.config.topic_arn, &message)
            .await?;

        self.store.write_marker(today.as_str()).await?;
        log::info!("Marker updated to {}", today);

        Ok(CheckOutcome::Notified)
    }
}
