// src/ingest/plugins/video.rs
//! Single-video lookup: fetches full per-video statistics for an explicit
//! id list. The richest of the three sources (views, likes, comments,
//! shares all present).

use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::normalize_title;
use crate::ingest::plugins::{parse_count, parse_published, PayloadSource};
use crate::ingest::types::{FetchError, FetchParams, RawRecord, SourcePlugin};
use crate::universal::{M_COMMENTS, M_LIKES, M_SHARES, M_VIEWS};

#[derive(Debug, Deserialize)]
struct VideoListing {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: Option<String>,
    snippet: Option<Snippet>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
    share_count: Option<String>,
}

pub struct VideoPlugin {
    payload: PayloadSource,
}

impl VideoPlugin {
    pub fn new(payload: PayloadSource) -> Self {
        Self { payload }
    }

    pub fn from_fixture(content: &str) -> Self {
        Self::new(PayloadSource::inline(content))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(PayloadSource::http(url))
    }
}

#[async_trait]
impl SourcePlugin for VideoPlugin {
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawRecord>, FetchError> {
        let ids = match params {
            FetchParams::Video { ids } => ids,
            _ => return Err(FetchError::fatal("video", "params", "expected video params")),
        };

        let joined = ids.join(",");
        let body = self
            .payload
            .load("video", &joined, &[("id", joined.as_str())])
            .await?;
        let listing: VideoListing = serde_json::from_str(&body)
            .map_err(|e| FetchError::fatal("video", joined.clone(), format!("bad payload: {e}")))?;

        let mut out = Vec::with_capacity(listing.items.len());
        for it in listing.items {
            let Some(id) = it.id else { continue };
            // A lookup answers only for the ids it was asked about.
            if !ids.is_empty() && !ids.iter().any(|w| w == &id) {
                continue;
            }
            let snippet = it.snippet.unwrap_or(Snippet {
                title: None,
                published_at: None,
            });
            let mut metrics = std::collections::HashMap::new();
            if let Some(st) = it.statistics {
                for (key, val) in [
                    (M_VIEWS, st.view_count),
                    (M_LIKES, st.like_count),
                    (M_COMMENTS, st.comment_count),
                    (M_SHARES, st.share_count),
                ] {
                    if let Some(n) = parse_count(val.as_deref()) {
                        metrics.insert(key.to_string(), n);
                    }
                }
            }
            out.push(RawRecord {
                source_type: "video".to_string(),
                external_id: id,
                title: normalize_title(snippet.title.as_deref().unwrap_or_default()),
                published_at: parse_published(snippet.published_at.as_deref()),
                metrics,
            });
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "youtube-video"
    }
}
