#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use telco_reviews::error::{Result, ReviewError};
use telco_reviews::types::{PageRequest, RawReview, ReviewPage, ReviewSource};

pub enum Scripted {
    Page(ReviewPage),
    Fail(String),
}

/// Review source that replays pages in order and records every request.
/// Once the script runs out it keeps answering with an empty, exhausted page.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ReviewSource for ScriptedSource {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<ReviewPage> {
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail(message)) => Err(ReviewError::Api { message }),
            None => Ok(ReviewPage::default()),
        }
    }
}

/// Source that never runs dry: every page is full, fresh, and has a token
pub struct EndlessSource {
    pub batch_at: DateTime<Utc>,
    requests: Mutex<usize>,
}

impl EndlessSource {
    pub fn new(batch_at: DateTime<Utc>) -> Self {
        Self {
            batch_at,
            requests: Mutex::new(0),
        }
    }

    pub fn request_count(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl ReviewSource for EndlessSource {
    fn source_name(&self) -> &'static str {
        "endless"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<ReviewPage> {
        let mut n = self.requests.lock().unwrap();
        *n += 1;
        let reviews = (0..request.count)
            .map(|i| review(&format!("u{}-{}", *n, i), "still fine", self.batch_at))
            .collect();
        Ok(ReviewPage {
            reviews,
            next_token: Some(format!("token-{}", *n)),
        })
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn review(user: &str, text: &str, at: DateTime<Utc>) -> RawReview {
    RawReview {
        review_id: Some(format!("{}-{}", user, at.timestamp())),
        user_name: user.to_string(),
        content: Some(text.to_string()),
        score: 3,
        at,
        reply_content: None,
        replied_at: None,
        thumbs_up_count: None,
        app_version: None,
    }
}

pub fn page(reviews: Vec<RawReview>, token: Option<&str>) -> Scripted {
    Scripted::Page(ReviewPage {
        reviews,
        next_token: token.map(str::to_string),
    })
}
