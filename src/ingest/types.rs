// src/ingest/types.rs
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical source categories. Plugins report the raw string form in
/// `RawRecord`; parsing happens during normalization so unrecognized
/// strings surface as a typed error instead of being dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Video,
    Channel,
    Trending,
}

impl SourceType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Some(Self::Video),
            "channel" => Some(Self::Channel),
            "trending" => Some(Self::Trending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Channel => "channel",
            Self::Trending => "trending",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unprocessed candidate as produced by a plugin. Metric fields vary by
/// source type (channel records carry subscriber counts, trending records
/// carry rank positions); absent fields are simply missing from the map.
/// Transient; never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub source_type: String, // e.g., "video", "channel", "trending"
    pub external_id: String,
    pub title: String,
    pub published_at: u64, // unix seconds
    pub metrics: HashMap<String, f64>,
}

impl RawRecord {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Per-variant fetch parameters, consumed by the matching plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FetchParams {
    Video {
        ids: Vec<String>,
    },
    Channel {
        channel_id: String,
        max_results: usize,
    },
    Trending {
        region: String,
        category: Option<String>,
        max_results: usize,
    },
}

/// Provider-side fetch failure. `retryable` tells the caller whether a
/// bounded retry makes sense (timeouts, 5xx) or the plugin should be
/// skipped for the pass (revoked access, bad params).
#[derive(Debug, Clone, Error)]
#[error("fetch failed ({source_type}, {subject}): {reason}")]
pub struct FetchError {
    pub source_type: &'static str,
    pub subject: String,
    pub reason: String,
    pub retryable: bool,
}

impl FetchError {
    pub fn fatal(
        source_type: &'static str,
        subject: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            subject: subject.into(),
            reason: reason.into(),
            retryable: false,
        }
    }

    pub fn retryable(
        source_type: &'static str,
        subject: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            subject: subject.into(),
            reason: reason.into(),
            retryable: true,
        }
    }
}

/// One polymorphic data source. A fresh `fetch` call re-fetches; plugins do
/// not retry internally; retry policy belongs to the caller.
#[async_trait::async_trait]
pub trait SourcePlugin: Send + Sync {
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawRecord>, FetchError>;
    fn name(&self) -> &'static str;
}
