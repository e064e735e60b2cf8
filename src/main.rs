use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use telco_reviews::apis::PlayStoreClient;
use telco_reviews::config::Config;
use telco_reviews::constants;
use telco_reviews::pipeline::{log_summary, window::parse_until, DateWindow, ReviewPipeline};
use telco_reviews::{logging, metrics};

#[derive(Parser)]
#[command(name = "telco_reviews")]
#[command(about = "Harvest and enrich Play Store reviews for Malaysian telco apps")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration (built-in defaults when absent)
    #[arg(long, default_value = constants::CONFIG_PATH)]
    config: PathBuf,

    /// Only run these apps (comma-separated names from the configuration)
    #[arg(long, value_delimiter = ',')]
    apps: Vec<String>,

    /// Override the output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Freeze the window end (YYYY-MM-DD or RFC 3339) instead of using now
    #[arg(long)]
    until: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = Config::load(&cli.config).context("loading configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let log_dir = config.log_dir.to_string_lossy().to_string();
    let _log_guard = logging::init_logging(&log_dir);

    if cli.config.exists() {
        info!(path = %cli.config.display(), apps = config.apps.len(), "Loaded configuration");
    } else {
        info!(path = %cli.config.display(), "No config file found, using built-in defaults");
    }

    if config.metrics.snapshot {
        metrics::init_metrics();
    }

    let apps = config.select_apps(&cli.apps)?;
    let until = cli
        .until
        .as_deref()
        .map(|value| parse_until(value, &config.offset()?))
        .transpose()?;
    let window = DateWindow::from_config(&config, until)?;
    info!(
        start = %window.start,
        end = %window.end,
        apps = apps.len(),
        output_dir = %config.output_dir.display(),
        "Starting review harvest"
    );

    let source = PlayStoreClient::new(config.fetch.request_timeout())?;
    let pipeline = ReviewPipeline::new(&config, Box::new(source), window)?;
    let summary = pipeline.run(&apps).await;
    log_summary(&summary);

    if config.metrics.snapshot {
        let path = config.output_dir.join(constants::METRICS_SNAPSHOT_FILE);
        match metrics::write_snapshot(&path) {
            Ok(true) => info!(path = %path.display(), "Wrote metrics snapshot"),
            Ok(false) => warn!("Metrics recorder not installed, no snapshot written"),
            Err(e) => warn!("Failed to write metrics snapshot: {}", e),
        }
    }

    Ok(())
}
