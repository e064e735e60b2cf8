use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked application: display name plus Play Store package id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSource {
    pub name: String,
    pub package: String,
}

impl AppSource {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }
}

/// Review as returned by the store. Optional fields are the ones the store
/// omits for some reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    pub review_id: Option<String>,
    pub user_name: String,
    pub content: Option<String>,
    pub score: u8,
    pub at: DateTime<Utc>,
    pub reply_content: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub thumbs_up_count: Option<u64>,
    pub app_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    MostRelevant,
    Newest,
    Rating,
}

impl SortOrder {
    /// Numeric sort id understood by the store RPC
    pub fn rpc_value(self) -> u8 {
        match self {
            SortOrder::MostRelevant => 1,
            SortOrder::Newest => 2,
            SortOrder::Rating => 3,
        }
    }
}

/// Arguments for one page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub package: String,
    pub lang: String,
    pub country: String,
    pub sort: SortOrder,
    pub count: u32,
    pub continuation_token: Option<String>,
}

/// One page of reviews and the token for the next one, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPage {
    pub reviews: Vec<RawReview>,
    pub next_token: Option<String>,
}

impl ReviewPage {
    /// The token to continue from, treating an empty string as exhausted
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Core trait that every review backend implements
#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    /// Unique identifier for this backend, used in logs and metrics
    fn source_name(&self) -> &'static str;

    /// Fetch a single page of reviews
    async fn fetch_page(&self, request: &PageRequest) -> Result<ReviewPage>;
}
