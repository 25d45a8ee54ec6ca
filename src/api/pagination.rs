//! Cursor pagination
//!
//! Repeats a single-page fetch, threading `next_max_id`, until the feed runs
//! dry or the caller has enough items. A page that fails or lacks the
//! expected fields ends the run with what was collected so far.

use super::backoff::{CourtesyDelay, Sleeper};
use crate::types::ResponseEnvelope;
use crate::{Error, Result};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

/// Cursor field every paginated endpoint returns
pub const CURSOR_FIELD: &str = "next_max_id";

/// Shape of a paginated response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// Array field holding the page items
    pub items_field: &'static str,
    /// Boolean field that must be true for another page to exist
    pub more_field: Option<&'static str>,
    /// Hard cap on pages fetched
    pub max_pages: Option<usize>,
}

impl PageSpec {
    /// Follower/following lists: `users`, continued while `big_list`
    pub const USERS: Self = Self {
        items_field: "users",
        more_field: Some("big_list"),
        max_pages: None,
    };

    /// User feeds: `items`, continued while `more_available`
    pub const FEED: Self = Self {
        items_field: "items",
        more_field: Some("more_available"),
        max_pages: None,
    };

    /// Tag feeds: `items`, continued while a cursor is present
    pub const ITEMS: Self = Self {
        items_field: "items",
        more_field: None,
        max_pages: None,
    };

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Accumulates items across pages
#[derive(Debug)]
pub struct Paginator<'a, S: Sleeper> {
    sleeper: &'a S,
    courtesy: CourtesyDelay,
}

impl<'a, S: Sleeper> Paginator<'a, S> {
    pub fn new(sleeper: &'a S, courtesy: CourtesyDelay) -> Self {
        Self { sleeper, courtesy }
    }

    /// Fetch pages with `fetch(cursor)` until one of the stop conditions holds.
    ///
    /// The first cursor is the empty string. The result never holds more than
    /// `limit` items.
    pub async fn collect<F, Fut>(
        &self,
        spec: PageSpec,
        limit: Option<usize>,
        mut fetch: F,
    ) -> Result<Vec<Value>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<ResponseEnvelope>>,
    {
        let mut collected: Vec<Value> = Vec::new();
        let mut cursor = String::new();
        let mut pages = 0usize;
        let mut since_pause = 0usize;

        if limit == Some(0) {
            return Ok(collected);
        }

        loop {
            if spec.max_pages.is_some_and(|max| pages >= max) {
                debug!("Page cap of {} reached", pages);
                break;
            }

            let envelope = match fetch(cursor.clone()).await {
                Ok(envelope) => envelope,
                Err(Error::NotAuthenticated) => return Err(Error::NotAuthenticated),
                Err(e) => {
                    warn!(
                        "Page {} failed ({}), stopping with {} items",
                        pages + 1,
                        e,
                        collected.len()
                    );
                    break;
                }
            };
            pages += 1;

            let Some(items) = envelope.json.get(spec.items_field).and_then(Value::as_array) else {
                debug!("No '{}' in page {}, stopping", spec.items_field, pages);
                break;
            };
            if items.is_empty() {
                break;
            }

            for item in items {
                if limit.is_some_and(|l| collected.len() >= l) {
                    break;
                }
                collected.push(item.clone());
                since_pause += 1;
                if since_pause >= self.courtesy.every {
                    let delay = self.courtesy.pick();
                    info!(
                        "Waiting {:.2} min. due to too many requests",
                        delay.as_secs_f64() / 60.0
                    );
                    self.sleeper.sleep(delay).await;
                    since_pause = 0;
                }
            }
            debug!("Page {}: {} items so far", pages, collected.len());

            if limit.is_some_and(|l| collected.len() >= l) {
                break;
            }

            if let Some(flag) = spec.more_field
                && !envelope.json.get(flag).and_then(Value::as_bool).unwrap_or(false)
            {
                break;
            }

            match next_cursor(&envelope.json) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Ok(collected)
    }
}

/// `next_max_id` as a string; numeric cursors are stringified
pub fn next_cursor(json: &Value) -> Option<String> {
    match json.get(CURSOR_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
