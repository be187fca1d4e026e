//! Per-request diagnostic context.
//!
//! A [`TraceContext`] identifies one externally visible request (for the HTTP
//! surface, one scan) and carries the instant it started plus a small bag of
//! tags. Branching with [`TraceContext::tag`] copies the tag map, so sibling
//! branches (one per document segment, say) never see each other's tags while
//! still sharing `id` and `start` for correlated log lines.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct TraceContext {
    id: Arc<str>,
    start: Instant,
    tags: BTreeMap<String, Value>,
}

impl TraceContext {
    /// Start a new context for the request identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_start(id, Instant::now())
    }

    pub fn with_start(id: impl Into<String>, start: Instant) -> Self {
        Self {
            id: Arc::from(id.into()),
            start,
            tags: BTreeMap::new(),
        }
    }

    /// Start a new context with a random hex id.
    pub fn new_root() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn tags(&self) -> &BTreeMap<String, Value> {
        &self.tags
    }

    pub fn get_tag(&self, key: &str) -> Option<&Value> {
        self.tags.get(key)
    }

    /// Branch off a child carrying this context's tags plus `key = value`.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn tag(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut tags = self.tags.clone();
        tags.insert(key.into(), value.into());
        Self {
            id: Arc::clone(&self.id),
            start: self.start,
            tags,
        }
    }

    /// Emit a debug line correlated by id and time since start.
    pub fn debug(&self, msg: &str) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        let elapsed = format!("{:.6}", self.elapsed().as_secs_f64());
        tracing::debug!(
            trace_id = %self.id,
            elapsed = %elapsed,
            tags = %self.tags_json(),
            "{msg}"
        );
    }

    fn tags_json(&self) -> String {
        serde_json::to_string(&self.tags).unwrap_or_default()
    }
}
