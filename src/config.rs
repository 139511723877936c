// src/config.rs
//! Process-wide settings. Loaded once at startup, read-only afterwards.
//!
//! Resolution order:
//! 1) $HARVESTER_CONFIG_PATH
//! 2) config/harvester.toml
//! 3) config/harvester.json
//! 4) built-in defaults

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "HARVESTER_CONFIG_PATH";

/// Composite-score weights plus the saturation scales that map each term
/// into [0,1]. The scales live here rather than as hidden constants so the
/// curve choice (log) is visible alongside the weights it feeds.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ScoreWeights {
    pub w_views: f64,
    pub w_engagement: f64,
    pub w_velocity: f64,
    #[serde(default = "default_views_scale")]
    pub views_scale: f64,
    #[serde(default = "default_engagement_scale")]
    pub engagement_scale: f64,
    #[serde(default = "default_velocity_scale")]
    pub velocity_scale: f64,
}

fn default_views_scale() -> f64 {
    1_000_000.0
}

fn default_engagement_scale() -> f64 {
    1.0
}

fn default_velocity_scale() -> f64 {
    10_000.0
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            w_views: 0.5,
            w_engagement: 0.3,
            w_velocity: 0.2,
            views_scale: default_views_scale(),
            engagement_scale: default_engagement_scale(),
            velocity_scale: default_velocity_scale(),
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.w_views + self.w_engagement + self.w_velocity
    }
}

/// Optional per-source HTTP endpoints for the binary. Absent entries mean
/// that source is not harvested in this deployment.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EndpointConfig {
    pub video_url: Option<String>,
    pub channel_url: Option<String>,
    pub trending_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub score_weights: ScoreWeights,
    pub max_results_per_fetch: usize,
    pub rate_limit_per_minute: u32,
    pub pass_interval_secs: u64,
    pub video_ids: Vec<String>,
    pub channel_ids: Vec<String>,
    pub trending_region: String,
    pub trending_category: Option<String>,
    pub endpoints: EndpointConfig,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            max_results_per_fetch: 50,
            rate_limit_per_minute: 30,
            pass_interval_secs: 900,
            video_ids: Vec::new(),
            channel_ids: Vec::new(),
            trending_region: "US".to_string(),
            trending_category: None,
            endpoints: EndpointConfig::default(),
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<HarvesterConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading harvester config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load config using env var + fallbacks; defaults when no file is present.
pub fn load_default() -> Result<HarvesterConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("HARVESTER_CONFIG_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/harvester.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/harvester.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(HarvesterConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<HarvesterConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("score_weights");
    if try_toml {
        if let Ok(v) = toml::from_str::<HarvesterConfig>(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str::<HarvesterConfig>(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<HarvesterConfig>(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported harvester config format"))
}
