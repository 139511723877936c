// src/ingest/mod.rs
pub mod plugins;
pub mod scheduler;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{FetchError, FetchParams, RawRecord, SourcePlugin};
use crate::processor::{IdeaProcessor, ProcessingSummary};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "harvest_records_total",
            "Raw records fetched from plugins."
        );
        describe_counter!("harvest_created_total", "Idea records created.");
        describe_counter!("harvest_updated_total", "Idea records refreshed.");
        describe_counter!(
            "harvest_failed_total",
            "Records rejected by validation/normalization/persistence."
        );
        describe_counter!(
            "harvest_plugin_errors_total",
            "Plugin fetch failures (any kind)."
        );
        describe_histogram!("harvest_fetch_ms", "Plugin fetch time in milliseconds.");
        describe_gauge!(
            "harvest_last_pass_ts",
            "Unix ts when the harvest pass last ran."
        );
    });
}

/// Normalize a title: decode HTML entities, strip tags, collapse whitespace.
/// Shorts titles routinely arrive entity-encoded from the provider side.
pub fn normalize_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 300 chars
    if out.chars().count() > 300 {
        out = out.chars().take(300).collect();
    }

    out
}

/// One configured data source: a plugin plus the params it is fetched with.
pub struct HarvestSource {
    pub plugin: Box<dyn SourcePlugin>,
    pub params: FetchParams,
}

impl HarvestSource {
    pub fn new(plugin: Box<dyn SourcePlugin>, params: FetchParams) -> Self {
        Self { plugin, params }
    }
}

/// Outcome of one harvest pass: the processing summary plus any plugin
/// fetch failures. Retryable failures are left to the caller's retry
/// policy; either kind skips only that plugin's records for this pass.
pub struct PassOutcome {
    pub summary: ProcessingSummary,
    pub fetch_errors: Vec<FetchError>,
}

/// Run one harvest pass: fetch all sources concurrently, then process the
/// combined batch. Record order within a single plugin's result is
/// preserved; order across plugins follows the source list, which is not a
/// contract.
pub async fn run_pass(sources: &[HarvestSource], processor: &IdeaProcessor) -> PassOutcome {
    ensure_metrics_described();

    let fetches = sources.iter().map(|s| async move {
        let t0 = std::time::Instant::now();
        let res = s.plugin.fetch(&s.params).await;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("harvest_fetch_ms").record(ms);
        (s.plugin.name(), res)
    });
    let results = futures::future::join_all(fetches).await;

    let mut raw: Vec<RawRecord> = Vec::new();
    let mut fetch_errors = Vec::new();
    for (name, res) in results {
        match res {
            Ok(mut v) => {
                counter!("harvest_records_total").increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(plugin = name, error = %e, retryable = e.retryable, "plugin fetch failed");
                counter!("harvest_plugin_errors_total").increment(1);
                fetch_errors.push(e);
            }
        }
    }

    let summary = processor.process(raw).await;

    // Telemetry
    counter!("harvest_created_total").increment(summary.created as u64);
    counter!("harvest_updated_total").increment(summary.updated as u64);
    counter!("harvest_failed_total").increment(summary.failed_count() as u64);
    let now = chrono::Utc::now().timestamp().max(0) as f64;
    gauge!("harvest_last_pass_ts").set(now);

    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        failed = summary.failed_count(),
        plugin_errors = fetch_errors.len(),
        "harvest pass finished"
    );

    PassOutcome {
        summary,
        fetch_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_title_decodes_and_collapses() {
        let s = "  POV:&nbsp;&nbsp;you <b>tried</b> this   hack ";
        assert_eq!(normalize_title(s), "POV: you tried this hack");
    }

    #[test]
    fn normalize_title_caps_length() {
        let s = "x".repeat(500);
        assert_eq!(normalize_title(&s).chars().count(), 300);
    }
}
