use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::constants::GENERAL_CATEGORY;
use crate::pipeline::processing::classify::ClassifierRules;
use crate::pipeline::processing::normalize::ReviewRow;

/// One exported row. Field order and renames fix the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedReview {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Time", serialize_with = "serialize_time")]
    pub time: NaiveTime,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Review")]
    pub review: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: u8,
    #[serde(rename = "ReviewCategory")]
    pub review_category: String,
    #[serde(rename = "ReviewLength")]
    pub review_length: usize,
    #[serde(rename = "ReviewLanguage")]
    pub review_language: String,
    #[serde(rename = "ReviewResponse")]
    pub review_response: Option<String>,
    #[serde(rename = "ResponseTime")]
    pub response_time: Option<f64>,
    #[serde(rename = "ThumbsUpCount")]
    pub thumbs_up_count: u64,
    #[serde(rename = "UserState")]
    pub user_state: String,
    #[serde(rename = "UserCountry")]
    pub user_country: String,
}

fn serialize_time<S: serde::Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M:%S"))
}

/// Pluggable language identification. Returns the detector's raw code, or
/// `None` when it cannot decide.
pub trait LanguageDetector: Send + Sync {
    fn detect_code(&self, text: &str) -> Option<String>;
}

/// Trigram detector from `whatlang`, reporting ISO 639-3 codes
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect_code(&self, text: &str) -> Option<String> {
        whatlang::detect(text).map(|info| info.lang().code().to_string())
    }
}

/// Trait for turning a normalized row into an exported record
pub trait Enricher {
    fn enrich(&self, row: &ReviewRow) -> EnrichedReview;
}

/// Keyword and language based enrichment for app store reviews
pub struct ReviewEnricher {
    rules: ClassifierRules,
    detector: Box<dyn LanguageDetector>,
    country_label: String,
}

impl ReviewEnricher {
    pub fn new(rules: ClassifierRules, country_label: impl Into<String>) -> Self {
        Self::with_detector(rules, country_label, Box::new(WhatlangDetector))
    }

    pub fn with_detector(
        rules: ClassifierRules,
        country_label: impl Into<String>,
        detector: Box<dyn LanguageDetector>,
    ) -> Self {
        Self {
            rules,
            detector,
            country_label: country_label.into(),
        }
    }

    /// First region whose keyword appears in `text`, or an empty string
    pub fn detect_region(&self, text: Option<&str>) -> String {
        text.and_then(|t| self.rules.regions.first_match(t))
            .unwrap_or_default()
            .to_string()
    }

    /// Language tag for `text`. Empty or emoji-only text is unknown; anything
    /// the detector cannot place, or places outside the table, is the default tag.
    pub fn detect_language(&self, text: Option<&str>) -> String {
        let languages = &self.rules.languages;
        match text {
            Some(t) if !is_symbolic_only(t) => {
                let code = self.detector.detect_code(t);
                languages.tag_for(code.as_deref()).to_string()
            }
            _ => languages.unknown_tag().to_string(),
        }
    }

    /// First category whose keyword appears in `text`, defaulting to "General"
    pub fn categorize(&self, text: Option<&str>) -> String {
        text.filter(|t| !t.is_empty())
            .and_then(|t| self.rules.categories.first_match(t))
            .unwrap_or(GENERAL_CATEGORY)
            .to_string()
    }
}

impl Enricher for ReviewEnricher {
    fn enrich(&self, row: &ReviewRow) -> EnrichedReview {
        let review = row.review.as_deref();
        let location_text = format!("{} {}", row.username, review.unwrap_or_default());

        EnrichedReview {
            username: row.username.clone(),
            date: row.submitted_at.date_naive(),
            time: row.submitted_at.time().with_nanosecond(0).unwrap_or_default(),
            day: row.submitted_at.format("%A").to_string(),
            review: row.review.clone(),
            rating: row.rating,
            review_category: self.categorize(review),
            review_length: word_count(review),
            review_language: self.detect_language(review),
            review_response: row.response.clone(),
            response_time: compute_response_latency(&row.submitted_at, row.responded_at.as_ref()),
            thumbs_up_count: row.thumbs_up_count,
            user_state: self.detect_region(Some(&location_text)),
            user_country: self.country_label.clone(),
        }
    }
}

/// Hours from submission to reply; `None` when there is no reply
pub fn compute_response_latency(
    submitted_at: &DateTime<FixedOffset>,
    replied_at: Option<&DateTime<FixedOffset>>,
) -> Option<f64> {
    replied_at.map(|replied| (*replied - *submitted_at).num_milliseconds() as f64 / 3_600_000.0)
}

/// True when every grapheme of `text` is an emoji. Empty text counts too.
pub fn is_symbolic_only(text: &str) -> bool {
    text.graphemes(true).all(|g| emojis::get(g).is_some())
}

pub fn word_count(text: Option<&str>) -> usize {
    text.map(|t| t.split_whitespace().count()).unwrap_or(0)
}
