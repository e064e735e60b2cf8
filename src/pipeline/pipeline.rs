use chrono::FixedOffset;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::constants::anonymized_author;
use crate::error::Result;
use crate::metrics;
use crate::pipeline::csv_out::write_reviews_csv;
use crate::pipeline::ingestion::retriever::{Retriever, RetrieverSettings};
use crate::pipeline::processing::classify::ClassifierRules;
use crate::pipeline::processing::enrich::{EnrichedReview, Enricher, ReviewEnricher};
use crate::pipeline::processing::normalize::normalize_batch;
use crate::pipeline::window::DateWindow;
use crate::types::{AppSource, RawReview, ReviewSource};

/// What happened to one app during a run
#[derive(Debug, Clone, PartialEq)]
pub enum AppOutcome {
    Exported { rows: usize, fetched: usize, path: PathBuf },
    /// The source had no reviews at all
    NoReviews,
    /// Reviews were fetched but none fell inside the window
    NoneInWindow { fetched: usize },
    /// Retrieval or export failed; nothing was written
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct AppRunResult {
    pub app: String,
    pub outcome: AppOutcome,
}

/// Per-app results of a full run, in processing order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<AppRunResult>,
}

impl RunSummary {
    pub fn exported(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, AppOutcome::Exported { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, AppOutcome::Failed { .. }))
            .count()
    }

    pub fn get(&self, app: &str) -> Option<&AppOutcome> {
        self.results.iter().find(|r| r.app == app).map(|r| &r.outcome)
    }
}

/// Retrieve, filter, enrich and export reviews, one app at a time
pub struct ReviewPipeline {
    source: Box<dyn ReviewSource>,
    enricher: ReviewEnricher,
    settings: RetrieverSettings,
    window: DateWindow,
    offset: FixedOffset,
    placeholder_author: String,
    output_dir: PathBuf,
}

impl ReviewPipeline {
    pub fn new(config: &Config, source: Box<dyn ReviewSource>, window: DateWindow) -> Result<Self> {
        let enricher = ReviewEnricher::new(ClassifierRules::from_config(config), config.country_label.clone());
        Self::with_enricher(config, source, enricher, window)
    }

    pub fn with_enricher(
        config: &Config,
        source: Box<dyn ReviewSource>,
        enricher: ReviewEnricher,
        window: DateWindow,
    ) -> Result<Self> {
        Ok(Self {
            source,
            enricher,
            settings: RetrieverSettings::from(&config.fetch),
            window,
            offset: config.offset()?,
            placeholder_author: config.placeholder_author.clone(),
            output_dir: config.output_dir.clone(),
        })
    }

    /// Run every app in order. Failures are recorded and never stop the run.
    pub async fn run(&self, apps: &[AppSource]) -> RunSummary {
        let t_run = Instant::now();
        let mut summary = RunSummary::default();

        for app in apps {
            let span = info_span!("app", app = %app.name, package = %app.package);
            let outcome = match self.run_for_app(app).instrument(span.clone()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    span.in_scope(|| error!("Error streaming {}: {}", app.name, e));
                    metrics::pipeline::failed(&app.name);
                    AppOutcome::Failed { error: e.to_string() }
                }
            };
            summary.results.push(AppRunResult {
                app: app.name.clone(),
                outcome,
            });
        }

        metrics::pipeline::run_duration(t_run.elapsed().as_secs_f64());
        summary
    }

    /// Retrieve and export one app. Errors leave no file behind.
    pub async fn run_for_app(&self, app: &AppSource) -> Result<AppOutcome> {
        info!("Streaming {}...", app.name);
        let retriever = Retriever::new(self.source.as_ref(), &self.settings);
        let retrieval = retriever.retrieve(app, self.window.start).await?;

        if retrieval.reviews.is_empty() {
            info!("No reviews found for {}. Skipping.", app.name);
            metrics::pipeline::skipped(&app.name, "no_reviews");
            return Ok(AppOutcome::NoReviews);
        }

        let fetched = retrieval.reviews.len();
        let rows = self.transform(app, retrieval.reviews);
        if rows.is_empty() {
            info!(fetched, "No reviews inside the date window for {}. Skipping.", app.name);
            metrics::pipeline::skipped(&app.name, "none_in_window");
            return Ok(AppOutcome::NoneInWindow { fetched });
        }

        let path = write_reviews_csv(&rows, &self.output_dir, &app.name)?;
        metrics::pipeline::exported(&app.name, rows.len());
        info!(rows = rows.len(), fetched, path = %path.display(), "{} reviews saved", app.name);

        Ok(AppOutcome::Exported {
            rows: rows.len(),
            fetched,
            path,
        })
    }

    /// Normalize, window-filter, anonymize and enrich a fetched batch
    pub fn transform(&self, app: &AppSource, raw: Vec<RawReview>) -> Vec<EnrichedReview> {
        let replacement = anonymized_author(&app.name);
        normalize_batch(raw, &self.offset, &self.window)
            .into_iter()
            .map(|mut row| {
                row.anonymize(&self.placeholder_author, &replacement);
                self.enricher.enrich(&row)
            })
            .collect()
    }
}

/// Log one line per app plus totals
pub fn log_summary(summary: &RunSummary) {
    for result in &summary.results {
        match &result.outcome {
            AppOutcome::Exported { rows, fetched, path } => {
                info!(app = %result.app, rows, fetched, path = %path.display(), "exported")
            }
            AppOutcome::NoReviews => info!(app = %result.app, "skipped: no reviews"),
            AppOutcome::NoneInWindow { fetched } => {
                info!(app = %result.app, fetched, "skipped: nothing inside window")
            }
            AppOutcome::Failed { error } => warn!(app = %result.app, %error, "failed"),
        }
    }
    info!(
        apps = summary.results.len(),
        exported = summary.exported(),
        failed = summary.failed(),
        "Run complete"
    );
}
