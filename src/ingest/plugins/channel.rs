// src/ingest/plugins/channel.rs
//! Channel-scoped listing: recent shorts for one channel, paginated and
//! bounded by `max_results`. The payload carries channel-level audience
//! movement (subscriber counts), not per-video view counts, so those
//! metrics annotate every listed short.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::normalize_title;
use crate::ingest::plugins::{parse_count, parse_published, PayloadSource};
use crate::ingest::types::{FetchError, FetchParams, RawRecord, SourcePlugin};
use crate::universal::{M_COMMENTS, M_SUBSCRIBER_DELTA};

pub const M_SUBSCRIBER_COUNT: &str = "subscriber_count";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelListing {
    channel_id: Option<String>,
    subscriber_count: Option<String>,
    subscriber_delta: Option<String>,
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    video_id: Option<String>,
    title: Option<String>,
    published_at: Option<String>,
    comment_count: Option<String>,
}

pub struct ChannelPlugin {
    payload: PayloadSource,
}

impl ChannelPlugin {
    pub fn new(payload: PayloadSource) -> Self {
        Self { payload }
    }

    pub fn from_fixture(content: &str) -> Self {
        Self::new(PayloadSource::inline(content))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(PayloadSource::http(url))
    }

    fn records_from(&self, listing: ChannelListing, channel_id: &str) -> Vec<RawRecord> {
        let sub_count = parse_count(listing.subscriber_count.as_deref());
        let sub_delta = parse_count(listing.subscriber_delta.as_deref());
        let listed_channel = listing.channel_id.unwrap_or_else(|| channel_id.to_string());

        let mut out = Vec::with_capacity(listing.items.len());
        for it in listing.items {
            let Some(id) = it.video_id else { continue };
            let mut metrics = std::collections::HashMap::new();
            if let Some(n) = sub_count {
                metrics.insert(M_SUBSCRIBER_COUNT.to_string(), n);
            }
            if let Some(n) = sub_delta {
                metrics.insert(M_SUBSCRIBER_DELTA.to_string(), n);
            }
            if let Some(n) = parse_count(it.comment_count.as_deref()) {
                metrics.insert(M_COMMENTS.to_string(), n);
            }
            out.push(RawRecord {
                source_type: "channel".to_string(),
                // Scope the id by channel so the same short surfacing via
                // two channels' feeds stays distinguishable.
                external_id: format!("{listed_channel}:{id}"),
                title: normalize_title(it.title.as_deref().unwrap_or_default()),
                published_at: parse_published(it.published_at.as_deref()),
                metrics,
            });
        }
        out
    }
}

#[async_trait]
impl SourcePlugin for ChannelPlugin {
    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawRecord>, FetchError> {
        let (channel_id, max_results) = match params {
            FetchParams::Channel {
                channel_id,
                max_results,
            } => (channel_id.as_str(), *max_results),
            _ => {
                return Err(FetchError::fatal(
                    "channel",
                    "params",
                    "expected channel params",
                ))
            }
        };

        let mut out: Vec<RawRecord> = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = vec![("channelId", channel_id)];
            if let Some(tok) = page_token.as_deref() {
                query.push(("pageToken", tok));
            }
            let body = self.payload.load("channel", channel_id, &query).await?;
            let listing: ChannelListing = serde_json::from_str(&body).map_err(|e| {
                FetchError::fatal("channel", channel_id, format!("bad payload: {e}"))
            })?;
            let next = listing.next_page_token.clone();
            let before = out.len();
            out.extend(self.records_from(listing, channel_id));

            // A page that contributes nothing cannot make progress toward
            // max_results; following its token would re-fetch forever.
            if out.len() >= max_results
                || out.len() == before
                || next.is_none()
                || !self.payload.is_paginated()
            {
                break;
            }
            page_token = next;
        }
        out.truncate(max_results);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "youtube-channel"
    }
}
