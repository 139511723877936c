// src/processor.rs
//! # Idea Processor
//! Batch loop that turns raw plugin records into persisted idea records:
//! validate, normalize, dedup against the store, create or merge.
//!
//! Partial-failure semantics: one bad record never aborts the batch, and
//! there is no rollback; each record's persistence is an independent unit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::ScoreWeights;
use crate::ingest::types::{RawRecord, SourceType};
use crate::store::{IdeaRecord, IdeaStore, StoreError};
use crate::universal::{self, NormalizeError};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("missing required field: {0}")]
    Validation(&'static str),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// One rejected record, identifiable by its batch position.
#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    pub index: usize,
    pub external_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ProcessingSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: Vec<FailedRecord>,
}

impl ProcessingSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

pub struct IdeaProcessor {
    store: Arc<dyn IdeaStore>,
    weights: ScoreWeights,
}

impl IdeaProcessor {
    pub fn new(store: Arc<dyn IdeaStore>, weights: ScoreWeights) -> Self {
        Self { store, weights }
    }

    /// Process a batch in arrival order.
    pub async fn process(&self, records: Vec<RawRecord>) -> ProcessingSummary {
        let never = AtomicBool::new(false);
        self.process_with_cancel(records, &never).await
    }

    /// Like `process`, with a cooperative cancellation checkpoint between
    /// records. Already-persisted records stay intact; re-running the same
    /// batch is safe because of the dedup key.
    pub async fn process_with_cancel(
        &self,
        records: Vec<RawRecord>,
        cancel: &AtomicBool,
    ) -> ProcessingSummary {
        let mut summary = ProcessingSummary::default();
        let now = chrono::Utc::now().timestamp().max(0) as u64;

        for (index, raw) in records.into_iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!(index, "processing pass cancelled");
                break;
            }
            match self.process_one(&raw, now).await {
                Ok(Outcome::Created) => summary.created += 1,
                Ok(Outcome::Updated) => summary.updated += 1,
                Err(e) => {
                    tracing::debug!(index, id = %raw.external_id, error = %e, "record rejected");
                    summary.failed.push(FailedRecord {
                        index,
                        external_id: (!raw.external_id.is_empty())
                            .then(|| raw.external_id.clone()),
                        reason: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    async fn process_one(&self, raw: &RawRecord, now: u64) -> Result<Outcome, ProcessError> {
        if raw.external_id.trim().is_empty() {
            return Err(ProcessError::Validation("external_id"));
        }
        if raw.source_type.trim().is_empty() {
            return Err(ProcessError::Validation("source_type"));
        }

        let metrics = universal::normalize(raw, &self.weights, now)?;
        // normalize already rejected unknown source strings
        let source_type =
            SourceType::parse(&raw.source_type).ok_or(ProcessError::Validation("source_type"))?;

        match self.store.get(source_type, &raw.external_id).await? {
            None => {
                let record = IdeaRecord {
                    source_type,
                    external_id: raw.external_id.clone(),
                    title: raw.title.clone(),
                    published_at: raw.published_at,
                    metrics,
                    first_seen: now,
                    last_updated: now,
                    observation_count: 1,
                };
                self.store.upsert(record).await?;
                Ok(Outcome::Created)
            }
            Some(mut existing) => {
                // Latest observation wins: provider counters are cumulative,
                // so overwrite rather than average.
                existing.metrics = metrics;
                existing.title = raw.title.clone();
                existing.last_updated = now;
                existing.observation_count = existing.observation_count.saturating_add(1);
                self.store.upsert(existing).await?;
                Ok(Outcome::Updated)
            }
        }
    }
}

enum Outcome {
    Created,
    Updated,
}
