use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::window::DateWindow;
use crate::types::RawReview;

/// Canonical raw schema: every column present, absent reply data as `None`,
/// absent thumbs-up counter as zero, timestamps in the reporting offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub username: String,
    pub review: Option<String>,
    pub rating: u8,
    pub submitted_at: DateTime<FixedOffset>,
    pub response: Option<String>,
    pub responded_at: Option<DateTime<FixedOffset>>,
    pub thumbs_up_count: u64,
}

impl ReviewRow {
    pub fn from_raw(raw: RawReview, offset: &FixedOffset) -> Self {
        Self {
            username: raw.user_name,
            review: raw.content,
            rating: raw.score,
            submitted_at: raw.at.with_timezone(offset),
            response: raw.reply_content,
            responded_at: raw.replied_at.map(|t| t.with_timezone(offset)),
            thumbs_up_count: raw.thumbs_up_count.unwrap_or(0),
        }
    }

    pub fn submitted_utc(&self) -> DateTime<Utc> {
        self.submitted_at.with_timezone(&Utc)
    }

    /// Replaces the store's placeholder author with `replacement`
    pub fn anonymize(&mut self, placeholder: &str, replacement: &str) {
        if self.username == placeholder {
            self.username = replacement.to_string();
        }
    }
}

/// Normalizes a fetched batch and keeps the rows inside `window`, preserving order
pub fn normalize_batch(raw: Vec<RawReview>, offset: &FixedOffset, window: &DateWindow) -> Vec<ReviewRow> {
    raw.into_iter()
        .map(|r| ReviewRow::from_raw(r, offset))
        .filter(|row| window.contains(&row.submitted_utc()))
        .collect()
}
