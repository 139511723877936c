// src/ingest/plugins/mod.rs
pub mod channel;
pub mod trending;
pub mod video;

pub use channel::ChannelPlugin;
pub use trending::TrendingPlugin;
pub use video::VideoPlugin;

use crate::ingest::types::FetchError;

/// Where a plugin gets its JSON payload from: an inline document (fixtures,
/// tests) or an HTTP endpoint. Anti-bot evasion and raw HTML scraping live
/// behind the endpoint, not here.
pub enum PayloadSource {
    Inline(String),
    Http { client: reqwest::Client, url: String },
}

impl PayloadSource {
    pub fn inline(content: &str) -> Self {
        Self::Inline(content.to_string())
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self::Http {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub(crate) fn is_paginated(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Load one page. `query` is appended to the HTTP URL (ignored for
    /// inline payloads).
    pub(crate) async fn load(
        &self,
        source_type: &'static str,
        subject: &str,
        query: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        match self {
            Self::Inline(content) => Ok(content.clone()),
            Self::Http { client, url } => {
                let resp = client
                    .get(url)
                    .query(query)
                    .send()
                    .await
                    .map_err(|e| classify_reqwest(source_type, subject, &e))?;

                let status = resp.status();
                if status.as_u16() == 429 || status.is_server_error() {
                    return Err(FetchError::retryable(
                        source_type,
                        subject,
                        format!("http status {status}"),
                    ));
                }
                if !status.is_success() {
                    // 401/403/404: retrying won't help
                    return Err(FetchError::fatal(
                        source_type,
                        subject,
                        format!("http status {status}"),
                    ));
                }
                resp.text()
                    .await
                    .map_err(|e| classify_reqwest(source_type, subject, &e))
            }
        }
    }
}

fn classify_reqwest(source_type: &'static str, subject: &str, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::retryable(source_type, subject, e.to_string())
    } else {
        FetchError::fatal(source_type, subject, e.to_string())
    }
}

/// Provider counters arrive as JSON strings ("viewCount": "1000").
pub(crate) fn parse_count(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
}

/// RFC 3339 publish timestamps to unix seconds; unparseable input maps to 0
/// rather than dropping the record.
pub(crate) fn parse_published(s: Option<&str>) -> u64 {
    s.and_then(|v| chrono::DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}
