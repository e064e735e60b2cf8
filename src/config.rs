use chrono::{FixedOffset, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::error::{Result, ReviewError};
use crate::pipeline::processing::classify::{rules_from_static, KeywordRule};
use crate::types::AppSource;

/// Run configuration. Every key is optional in `config.toml`; anything left
/// out takes the built-in value from `constants`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub country_label: String,
    pub placeholder_author: String,
    pub utc_offset_hours: i32,
    pub fetch: FetchConfig,
    pub window: WindowConfig,
    pub apps: Vec<AppSource>,
    pub regions: Vec<KeywordRule>,
    pub categories: Vec<KeywordRule>,
    pub language: LanguageConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub lang: String,
    pub country: String,
    pub batch_size: u32,
    pub max_total: usize,
    pub delay_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Inclusive first day, local to `utc_offset_hours`
    pub start: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub default_tag: String,
    pub unknown_tag: String,
    pub codes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Write a Prometheus text snapshot next to the CSV files after the run
    pub snapshot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::OUTPUT_DIR),
            log_dir: PathBuf::from(constants::LOG_DIR),
            country_label: constants::COUNTRY_LABEL.to_string(),
            placeholder_author: constants::PLACEHOLDER_AUTHOR.to_string(),
            utc_offset_hours: constants::UTC_OFFSET_HOURS,
            fetch: FetchConfig::default(),
            window: WindowConfig::default(),
            apps: constants::DEFAULT_APPS
                .iter()
                .map(|(name, package)| AppSource::new(*name, *package))
                .collect(),
            regions: rules_from_static(constants::DEFAULT_REGION_KEYWORDS),
            categories: rules_from_static(constants::DEFAULT_CATEGORY_KEYWORDS),
            language: LanguageConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            lang: constants::FETCH_LANG.to_string(),
            country: constants::FETCH_COUNTRY.to_string(),
            batch_size: constants::BATCH_SIZE,
            max_total: constants::MAX_TOTAL_REVIEWS,
            delay_secs: constants::REQUEST_DELAY_SECS,
            request_timeout_secs: constants::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::parse_from_str(constants::WINDOW_START, "%Y-%m-%d")
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default_tag: constants::DEFAULT_LANGUAGE_TAG.to_string(),
            unknown_tag: constants::UNKNOWN_LANGUAGE_TAG.to_string(),
            codes: constants::DEFAULT_LANGUAGE_CODES
                .iter()
                .map(|(code, tag)| (code.to_string(), tag.to_string()))
                .collect(),
        }
    }
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from `path`. A missing file yields the built-in
    /// defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            ReviewError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.batch_size == 0 {
            return Err(ReviewError::Config("fetch.batch_size must be positive".into()));
        }
        if self.fetch.max_total == 0 {
            return Err(ReviewError::Config("fetch.max_total must be positive".into()));
        }
        if self.apps.is_empty() {
            return Err(ReviewError::Config("at least one app must be configured".into()));
        }
        let mut seen = HashSet::new();
        for app in &self.apps {
            if app.name.trim().is_empty() || app.package.trim().is_empty() {
                return Err(ReviewError::Config(format!(
                    "app entries need a name and a package (got '{}' / '{}')",
                    app.name, app.package
                )));
            }
            if !seen.insert(app.name.as_str()) {
                return Err(ReviewError::Config(format!("duplicate app name '{}'", app.name)));
            }
        }
        self.offset()?;
        Ok(())
    }

    /// Fixed offset the review timestamps are rendered in
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ReviewError::Config(format!("utc_offset_hours out of range: {}", self.utc_offset_hours)))
    }

    /// Configured apps restricted to `names`, in configuration order
    pub fn select_apps(&self, names: &[String]) -> Result<Vec<AppSource>> {
        if names.is_empty() {
            return Ok(self.apps.clone());
        }
        for name in names {
            if !self.apps.iter().any(|a| a.name.eq_ignore_ascii_case(name)) {
                return Err(ReviewError::Config(format!("unknown app '{}'", name)));
            }
        }
        Ok(self
            .apps
            .iter()
            .filter(|a| names.iter().any(|n| a.name.eq_ignore_ascii_case(n)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_builtin_tables() {
        let config = Config::default();
        assert_eq!(config.apps.len(), 5);
        assert_eq!(config.apps[0].name, "Maxis");
        assert_eq!(config.fetch.batch_size, 200);
        assert_eq!(config.fetch.max_total, 100_000);
        assert_eq!(config.fetch.delay(), Duration::from_secs(5));
        assert_eq!(config.window.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.regions[0].name, "Kuala Lumpur");
        assert_eq!(config.categories.last().unwrap().name, "General");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            output_dir = "exports"

            [fetch]
            batch_size = 50

            [window]
            start = "2023-06-01"

            [[apps]]
            name = "Digi"
            package = "com.digi.portal.mobdev.android"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.fetch.batch_size, 50);
        assert_eq!(config.fetch.max_total, 100_000);
        assert_eq!(config.fetch.country, "my");
        assert_eq!(config.window.start, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(config.apps, vec![AppSource::new("Digi", "com.digi.portal.mobdev.android")]);
        assert_eq!(config.regions.len(), 14);
    }

    #[test]
    fn test_region_table_order_follows_file() {
        let config = Config::from_toml(
            r#"
            [[regions]]
            name = "Selangor"
            keywords = ["subang"]

            [[regions]]
            name = "Kuala Lumpur"
            keywords = ["kl"]
            "#,
        )
        .unwrap();
        let names: Vec<&str> = config.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Selangor", "Kuala Lumpur"]);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let err = Config::from_toml("[fetch]\nbatch_size = 0\n").unwrap_err();
        assert!(matches!(err, ReviewError::Config(_)));
    }

    #[test]
    fn test_rejects_duplicate_apps() {
        let err = Config::from_toml(
            r#"
            [[apps]]
            name = "Maxis"
            package = "a"

            [[apps]]
            name = "Maxis"
            package = "b"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_bad_offset() {
        let err = Config::from_toml("utc_offset_hours = 30\n").unwrap_err();
        assert!(err.to_string().contains("utc_offset_hours"));
    }

    #[test]
    fn test_rejects_overflowing_offset() {
        let err = Config::from_toml("utc_offset_hours = 700000\n").unwrap_err();
        assert!(matches!(err, ReviewError::Config(ref m) if m.contains("700000")));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.apps.len(), 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "country_label = \"MY\"").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.country_label, "MY");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = Config::from_toml("fetch = [").unwrap_err();
        assert!(matches!(err, ReviewError::Toml(_)));
    }

    #[test]
    fn test_select_apps_keeps_config_order() {
        let config = Config::default();
        let picked = config
            .select_apps(&["tunetalk".to_string(), "Maxis".to_string()])
            .unwrap();
        let names: Vec<&str> = picked.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Maxis", "TuneTalk"]);

        assert!(config.select_apps(&["Unifi".to_string()]).is_err());
        assert_eq!(config.select_apps(&[]).unwrap().len(), 5);
    }
}
