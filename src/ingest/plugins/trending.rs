// src/ingest/plugins/trending.rs
//! Trending-feed listing: the current shorts trending list for a region,
//! optionally filtered by category, bounded by `max_results`. Carries rank
//! positions (and view counts when the feed exposes them) but no absolute
//! like counts.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::normalize_title;
use crate::ingest::plugins::{parse_count, parse_published, PayloadSource};
use crate::ingest::types::{FetchError, FetchParams, RawRecord, SourcePlugin};
use crate::universal::{M_RANK_IMPROVEMENT, M_VIEWS};

pub const M_RANK: &str = "rank";

#[derive(Debug, Deserialize)]
struct TrendingListing {
    #[serde(default)]
    items: Vec<TrendingItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingItem {
    video_id: Option<String>,
    title: Option<String>,
    published_at: Option<String>,
    rank: Option<u32>,
    previous_rank: Option<u32>,
    view_count: Option<String>,
    category: Option<String>,
}

pub struct TrendingPlugin {
    payload: PayloadSource,
}

impl TrendingPlugin {
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
impl SourcePlugin for TrendingPlugin {
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawRecord>, FetchError> {
        let (region, category, max_results) = match params {
            FetchParams::Trending {
                region,
                category,
                max_results,
            } => (region.as_str(), category.as_deref(), *max_results),
            _ => {
                return Err(FetchError::fatal(
                    "trending",
                    "params",
                    "expected trending params",
                ))
            }
        };

        let mut query: Vec<(&str, &str)> = vec![("region", region)];
        if let Some(cat) = category {
            query.push(("category", cat));
        }
        let body = self.payload.load("trending", region, &query).await?;
        let listing: TrendingListing = serde_json::from_str(&body)
            .map_err(|e| FetchError::fatal("trending", region, format!("bad payload: {e}")))?;

        let mut out = Vec::new();
        for it in listing.items {
            if out.len() >= max_results {
                break;
            }
            let Some(id) = it.video_id else { continue };
            if let (Some(want), Some(have)) = (category, it.category.as_deref()) {
                if !want.eq_ignore_ascii_case(have) {
                    continue;
                }
            }
            let mut metrics = std::collections::HashMap::new();
            if let Some(rank) = it.rank {
                metrics.insert(M_RANK.to_string(), rank as f64);
                // Climbing the chart counts as growth; a drop floors at 0
                // (universal metrics are never negative).
                let improvement = it.previous_rank.map(|p| p.saturating_sub(rank)).unwrap_or(0);
                metrics.insert(M_RANK_IMPROVEMENT.to_string(), improvement as f64);
            }
            if let Some(n) = parse_count(it.view_count.as_deref()) {
                metrics.insert(M_VIEWS.to_string(), n);
            }
            out.push(RawRecord {
                source_type: "trending".to_string(),
                external_id: id,
                title: normalize_title(it.title.as_deref().unwrap_or_default()),
                published_at: parse_published(it.published_at.as_deref()),
                metrics,
            });
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "youtube-trending"
    }
}
