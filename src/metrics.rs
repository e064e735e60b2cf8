//! Counters and histograms for the harvest run.
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! `init_metrics` installs the Prometheus recorder. The exposition text can
//! then be rendered in-process and written next to the exported files.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::Result;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle already set");
            }
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Current exposition text, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write the exposition text to `path`. Returns `false` when metrics were never initialized.
pub fn write_snapshot(path: &Path) -> Result<bool> {
    let Some(text) = render() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(true)
}

pub mod retrieval {
    use super::*;

    pub fn page_fetched(app: &str, reviews: usize, secs: f64) {
        counter!("reviews_pages_fetched_total", "app" => app.to_string()).increment(1);
        counter!("reviews_fetched_total", "app" => app.to_string()).increment(reviews as u64);
        histogram!("reviews_page_fetch_duration_seconds", "app" => app.to_string()).record(secs);
    }

    pub fn stopped(app: &str, reason: &'static str) {
        counter!("reviews_retrieval_stops_total", "app" => app.to_string(), "reason" => reason).increment(1);
    }
}

pub mod pipeline {
    use super::*;

    pub fn exported(app: &str, rows: usize) {
        counter!("reviews_exported_rows_total", "app" => app.to_string()).increment(rows as u64);
    }

    pub fn skipped(app: &str, reason: &'static str) {
        counter!("reviews_app_skipped_total", "app" => app.to_string(), "reason" => reason).increment(1);
    }

    pub fn failed(app: &str) {
        counter!("reviews_app_failures_total", "app" => app.to_string()).increment(1);
    }

    pub fn run_duration(secs: f64) {
        histogram!("reviews_run_duration_seconds").record(secs);
    }
}
