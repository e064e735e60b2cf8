use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::config::FetchConfig;
use crate::error::Result;
use crate::metrics;
use crate::types::{AppSource, PageRequest, RawReview, ReviewSource, SortOrder};

/// Knobs for one paged retrieval
#[derive(Debug, Clone)]
pub struct RetrieverSettings {
    pub lang: String,
    pub country: String,
    pub batch_size: u32,
    pub max_total: usize,
    pub delay: Duration,
}

impl From<&FetchConfig> for RetrieverSettings {
    fn from(fetch: &FetchConfig) -> Self {
        Self {
            lang: fetch.lang.clone(),
            country: fetch.country.clone(),
            batch_size: fetch.batch_size,
            max_total: fetch.max_total,
            delay: fetch.delay(),
        }
    }
}

/// Why the page loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source returned no continuation token
    Exhausted,
    /// The last page reached back past the window start
    ReachedWindowStart,
    /// Accumulated count hit the safety ceiling
    ReachedCeiling,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Exhausted => "exhausted",
            StopReason::ReachedWindowStart => "window_start",
            StopReason::ReachedCeiling => "ceiling",
        }
    }
}

/// Everything fetched for one app, newest first
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub reviews: Vec<RawReview>,
    pub pages: usize,
    pub stop_reason: StopReason,
}

/// Drives newest-first pagination against a `ReviewSource`.
///
/// Stop checks run after each page is appended, in order: token exhausted,
/// oldest review of that page before `window_start`, total at the ceiling.
/// The delay is awaited only between requests, never after the last one.
/// Any source error aborts the whole retrieval and drops what was gathered.
pub struct Retriever<'a> {
    source: &'a dyn ReviewSource,
    settings: &'a RetrieverSettings,
}

impl<'a> Retriever<'a> {
    pub fn new(source: &'a dyn ReviewSource, settings: &'a RetrieverSettings) -> Self {
        Self { source, settings }
    }

    #[instrument(skip(self, app), fields(app = %app.name, source = self.source.source_name()))]
    pub async fn retrieve(&self, app: &AppSource, window_start: DateTime<Utc>) -> Result<Retrieval> {
        let mut reviews: Vec<RawReview> = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        let stop_reason = loop {
            let request = PageRequest {
                package: app.package.clone(),
                lang: self.settings.lang.clone(),
                country: self.settings.country.clone(),
                sort: SortOrder::Newest,
                count: self.settings.batch_size,
                continuation_token: token.take(),
            };

            let t_fetch = Instant::now();
            let page = self.source.fetch_page(&request).await?;
            pages += 1;
            metrics::retrieval::page_fetched(&app.name, page.reviews.len(), t_fetch.elapsed().as_secs_f64());

            let next_token = page.continuation().map(str::to_owned);
            let oldest = page.reviews.iter().map(|r| r.at).min();
            debug!(page = pages, batch = page.reviews.len(), oldest = ?oldest, "Fetched page");
            reviews.extend(page.reviews);

            let Some(next_token) = next_token else {
                info!("No more continuation token");
                break StopReason::Exhausted;
            };
            if oldest.is_some_and(|at| at < window_start) {
                info!(%window_start, "Reached reviews older than the window start");
                break StopReason::ReachedWindowStart;
            }
            if reviews.len() >= self.settings.max_total {
                info!(max_total = self.settings.max_total, "Reached maximum total reviews limit");
                break StopReason::ReachedCeiling;
            }

            token = Some(next_token);
            if !self.settings.delay.is_zero() {
                tokio::time::sleep(self.settings.delay).await;
            }
        };

        metrics::retrieval::stopped(&app.name, stop_reason.as_str());
        info!(total = reviews.len(), pages, reason = stop_reason.as_str(), "Retrieval finished");

        Ok(Retrieval {
            reviews,
            pages,
            stop_reason,
        })
    }
}
