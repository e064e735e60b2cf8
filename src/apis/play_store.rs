use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{Result, ReviewError};
use crate::types::{PageRequest, RawReview, ReviewPage, ReviewSource};

const BATCHEXECUTE_URL: &str = "https://play.google.com/_/PlayStoreUi/data/batchexecute";
const REVIEWS_RPC_ID: &str = "UsvDTd";
const RESPONSE_PREFIX: &str = ")]}'";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Reviews backend talking to the Play Store web UI's `batchexecute` RPC
pub struct PlayStoreClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PlayStoreClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_endpoint(BATCHEXECUTE_URL, timeout)
    }

    /// Client against a different endpoint, e.g. a local stub
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait::async_trait]
impl ReviewSource for PlayStoreClient {
    fn source_name(&self) -> &'static str {
        "play_store"
    }

    #[instrument(skip(self, request), fields(package = %request.package, has_token = request.continuation_token.is_some()))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<ReviewPage> {
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("hl", request.lang.as_str()), ("gl", request.country.as_str())])
            .form(&[("f.req", build_request_body(request))])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ReviewError::Api {
                message: format!("review request for {} returned HTTP {}", request.package, status.as_u16()),
            });
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), "Received review page");
        parse_review_page(&body)
    }
}

/// Form value for the reviews RPC: an envelope holding the JSON-encoded inner request
pub fn build_request_body(request: &PageRequest) -> String {
    let token = match &request.continuation_token {
        Some(t) => Value::String(t.clone()),
        None => Value::Null,
    };
    let inner = json!([
        null,
        null,
        [2, request.sort.rpc_value(), [request.count, null, token], null, []],
        [request.package, 7]
    ]);
    json!([[[REVIEWS_RPC_ID, inner.to_string(), null, "generic"]]]).to_string()
}

/// Parses a `batchexecute` response body into a page.
///
/// A response whose payload slot is null means the app has no (more)
/// reviews and yields an empty, exhausted page.
pub fn parse_review_page(body: &str) -> Result<ReviewPage> {
    let envelope_text = body
        .trim_start()
        .strip_prefix(RESPONSE_PREFIX)
        .ok_or_else(|| ReviewError::Api {
            message: "unexpected response prefix".to_string(),
        })?;
    let envelope: Value = serde_json::from_str(envelope_text.trim_start())?;

    let payload = match envelope.pointer("/0/2") {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => return Ok(ReviewPage::default()),
        Some(other) => {
            return Err(ReviewError::Api {
                message: format!("unexpected payload type: {}", other),
            })
        }
    };
    let data: Value = serde_json::from_str(payload)?;

    let items = data
        .get(0)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let reviews = items.iter().map(parse_review).collect::<Result<Vec<_>>>()?;
    let next_token = next_page_token(&data);

    Ok(ReviewPage { reviews, next_token })
}

/// The token sits in the last element of the second-to-last slot
fn next_page_token(data: &Value) -> Option<String> {
    let slots = data.as_array()?;
    let holder = slots.len().checked_sub(2).and_then(|i| slots[i].as_array())?;
    holder.last()?.as_str().map(str::to_owned)
}

fn at_path<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, i| v.get(*i))
}

fn str_at(value: &Value, path: &[usize]) -> Option<String> {
    at_path(value, path).and_then(Value::as_str).map(str::to_owned)
}

fn timestamp_at(value: &Value, path: &[usize]) -> Option<DateTime<Utc>> {
    at_path(value, path)
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

fn parse_review(item: &Value) -> Result<RawReview> {
    let score = at_path(item, &[2])
        .and_then(Value::as_u64)
        .and_then(|s| u8::try_from(s).ok())
        .ok_or_else(|| ReviewError::MissingField("score".to_string()))?;
    let at = timestamp_at(item, &[5, 0]).ok_or_else(|| ReviewError::MissingField("at".to_string()))?;

    Ok(RawReview {
        review_id: str_at(item, &[0]),
        user_name: str_at(item, &[1, 0]).unwrap_or_default(),
        content: str_at(item, &[4]),
        score,
        at,
        reply_content: str_at(item, &[7, 1]),
        replied_at: timestamp_at(item, &[7, 2, 0]),
        thumbs_up_count: at_path(item, &[6]).and_then(Value::as_u64),
        app_version: str_at(item, &[10]),
    })
}
