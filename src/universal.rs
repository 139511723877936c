// src/universal.rs
//! Universal metrics normalization.
//!
//! Converts provider-specific raw metrics (partial per source type) into a
//! fixed vector plus a composite score. Pure function of its inputs: no
//! clock access (`now` is passed in), no I/O.
//!
//! Per-source policy:
//! - video:    views/likes/comments/shares; primary metric = views
//! - channel:  subscriber_count/subscriber_delta; primary = subscriber_delta
//! - trending: rank/rank_improvement (+ views when the feed exposes them);
//!             primary = rank_improvement
//!
//! Unmapped universal fields default to 0 so records stay comparable across
//! source types. composite_score = w_views*sat(views) +
//! w_engagement*sat(engagement_rate) + w_velocity*sat(velocity), each term
//! log-saturated into [0,1] (`ln(1+x)/ln(1+scale)`) so outliers cannot
//! dominate the ranking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScoreWeights;
use crate::ingest::types::{RawRecord, SourceType};

pub const M_VIEWS: &str = "views";
pub const M_LIKES: &str = "likes";
pub const M_COMMENTS: &str = "comments";
pub const M_SHARES: &str = "shares";
pub const M_SUBSCRIBER_DELTA: &str = "subscriber_delta";
pub const M_RANK_IMPROVEMENT: &str = "rank_improvement";
/// Optional override; when absent, age derives from `published_at` and `now`.
pub const M_AGE_HOURS: &str = "age_hours";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizeError {
    #[error("unsupported source type: {0:?}")]
    UnsupportedSourceType(String),
    #[error("invalid metric {name}: {value}")]
    InvalidMetric { name: String, value: f64 },
}

/// Fixed-schema normalized metrics, comparable across source types.
/// Every field is always present and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UniversalMetricVector {
    pub views: f64,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub engagement_rate: f64,
    pub velocity: f64,
    pub composite_score: f64,
}

/// Monotonic log saturation into [0,1]: 0 at x=0, 1 at x=scale, flat past it.
pub fn saturate(x: f64, scale: f64) -> f64 {
    if x <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    ((1.0 + x).ln() / (1.0 + scale).ln()).clamp(0.0, 1.0)
}

fn check_non_negative(raw: &RawRecord) -> Result<(), NormalizeError> {
    for (name, value) in &raw.metrics {
        if !value.is_finite() || *value < 0.0 {
            return Err(NormalizeError::InvalidMetric {
                name: name.clone(),
                value: *value,
            });
        }
    }
    Ok(())
}

fn age_hours(raw: &RawRecord, now: u64) -> f64 {
    raw.metric(M_AGE_HOURS)
        .unwrap_or_else(|| now.saturating_sub(raw.published_at) as f64 / 3600.0)
}

/// Normalize one raw record into the universal vector.
pub fn normalize(
    raw: &RawRecord,
    weights: &ScoreWeights,
    now: u64,
) -> Result<UniversalMetricVector, NormalizeError> {
    let source = SourceType::parse(&raw.source_type)
        .ok_or_else(|| NormalizeError::UnsupportedSourceType(raw.source_type.clone()))?;
    check_non_negative(raw)?;

    let views = raw.metric(M_VIEWS).unwrap_or(0.0);
    let likes = raw.metric(M_LIKES).unwrap_or(0.0);
    let comments = raw.metric(M_COMMENTS).unwrap_or(0.0);
    let shares = raw.metric(M_SHARES).unwrap_or(0.0);

    // Guard division by zero: a record with no views still gets a rate of 0.
    let engagement_rate = (likes + comments + shares) / views.max(1.0);

    let primary = match source {
        SourceType::Video => views,
        SourceType::Channel => raw.metric(M_SUBSCRIBER_DELTA).unwrap_or(0.0),
        SourceType::Trending => raw.metric(M_RANK_IMPROVEMENT).unwrap_or(0.0),
    };
    // max(age, 1h) keeps fresh uploads finite instead of exploding to infinity.
    let velocity = primary / age_hours(raw, now).max(1.0);

    let composite_score = weights.w_views * saturate(views, weights.views_scale)
        + weights.w_engagement * saturate(engagement_rate, weights.engagement_scale)
        + weights.w_velocity * saturate(velocity, weights.velocity_scale);

    Ok(UniversalMetricVector {
        views,
        likes,
        comments,
        shares,
        engagement_rate,
        velocity,
        composite_score,
    })
}
