// src/store.rs
//! Persistence boundary for idea records.
//!
//! `IdeaStore` is the narrow interface the processor sees; `MemoryStore` is
//! the in-process implementation behind a mutex. Storage technology is an
//! external concern: anything that can upsert by (source_type, external_id)
//! can sit behind this trait.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::types::SourceType;
use crate::universal::UniversalMetricVector;

/// Dedup key: one idea per (source_type, external_id) pair.
pub type IdeaKey = (SourceType, String);

/// The persisted unit. Created on first sighting of a key; refreshed
/// (latest metrics win, observation_count incremented) on later sightings.
/// Never deleted by this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub source_type: SourceType,
    pub external_id: String,
    pub title: String,
    pub published_at: u64,
    pub metrics: UniversalMetricVector,
    pub first_seen: u64,
    pub last_updated: u64,
    pub observation_count: u32,
}

impl IdeaRecord {
    pub fn key(&self) -> IdeaKey {
        (self.source_type, self.external_id.clone())
    }
}

#[derive(Debug, Clone, Error)]
#[error("store failure: {0}")]
pub struct StoreError(pub String);

#[async_trait::async_trait]
pub trait IdeaStore: Send + Sync {
    async fn get(
        &self,
        source_type: SourceType,
        external_id: &str,
    ) -> Result<Option<IdeaRecord>, StoreError>;

    /// Insert or replace by dedup key. Atomic per key.
    async fn upsert(&self, record: IdeaRecord) -> Result<(), StoreError>;

    /// Records touched at or after `since`, most recently updated first.
    async fn query_recent(&self, since: u64) -> Result<Vec<IdeaRecord>, StoreError>;

    /// Ranked read path for downstream consumers: highest composite first.
    async fn top_by_score(&self, limit: usize) -> Result<Vec<IdeaRecord>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<IdeaKey, IdeaRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl IdeaStore for MemoryStore {
    async fn get(
        &self,
        source_type: SourceType,
        external_id: &str,
    ) -> Result<Option<IdeaRecord>, StoreError> {
        let map = self.inner.lock().expect("store mutex poisoned");
        Ok(map.get(&(source_type, external_id.to_string())).cloned())
    }

    async fn upsert(&self, record: IdeaRecord) -> Result<(), StoreError> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        map.insert(record.key(), record);
        Ok(())
    }

    async fn query_recent(&self, since: u64) -> Result<Vec<IdeaRecord>, StoreError> {
        let map = self.inner.lock().expect("store mutex poisoned");
        let mut out: Vec<IdeaRecord> = map
            .values()
            .filter(|r| r.last_updated >= since)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.last_updated.cmp(&a.last_updated).then_with(|| a.key().cmp(&b.key())));
        Ok(out)
    }

    async fn top_by_score(&self, limit: usize) -> Result<Vec<IdeaRecord>, StoreError> {
        let map = self.inner.lock().expect("store mutex poisoned");
        let mut out: Vec<IdeaRecord> = map.values().cloned().collect();
        out.sort_by(|a, b| {
            b.metrics
                .composite_score
                .total_cmp(&a.metrics.composite_score)
                .then_with(|| a.key().cmp(&b.key()))
        });
        out.truncate(limit);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, last_updated: u64, score: f64) -> IdeaRecord {
        IdeaRecord {
            source_type: SourceType::Video,
            external_id: id.to_string(),
            title: id.to_string(),
            published_at: 0,
            metrics: UniversalMetricVector {
                composite_score: score,
                ..Default::default()
            },
            first_seen: last_updated,
            last_updated,
            observation_count: 1,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_key() {
        let store = MemoryStore::new();
        store.upsert(record("a", 10, 0.1)).await.unwrap();
        store.upsert(record("a", 20, 0.9)).await.unwrap();
        assert_eq!(store.len(), 1);
        let got = store.get(SourceType::Video, "a").await.unwrap().unwrap();
        assert_eq!(got.last_updated, 20);
    }

    #[tokio::test]
    async fn same_id_different_source_is_a_different_key() {
        let store = MemoryStore::new();
        store.upsert(record("a", 10, 0.1)).await.unwrap();
        let mut other = record("a", 10, 0.1);
        other.source_type = SourceType::Trending;
        store.upsert(other).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn query_recent_filters_and_sorts() {
        let store = MemoryStore::new();
        store.upsert(record("old", 5, 0.1)).await.unwrap();
        store.upsert(record("mid", 50, 0.2)).await.unwrap();
        store.upsert(record("new", 500, 0.3)).await.unwrap();
        let recent = store.query_recent(50).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|r| r.external_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }

    #[tokio::test]
    async fn top_by_score_ranks_descending() {
        let store = MemoryStore::new();
        store.upsert(record("lo", 1, 0.2)).await.unwrap();
        store.upsert(record("hi", 1, 0.8)).await.unwrap();
        store.upsert(record("mid", 1, 0.5)).await.unwrap();
        let top = store.top_by_score(2).await.unwrap();
        let ids: Vec<_> = top.iter().map(|r| r.external_id.as_str()).collect();
        assert_eq!(ids, vec!["hi", "mid"]);
    }
}
