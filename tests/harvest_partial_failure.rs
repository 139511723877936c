// tests/harvest_partial_failure.rs
//
// One bad record never aborts the batch; already-persisted records stay
// persisted even when a later one fails.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shorts_idea_harvester::config::ScoreWeights;
use shorts_idea_harvester::store::{IdeaRecord, IdeaStore, MemoryStore, StoreError};
use shorts_idea_harvester::{IdeaProcessor, RawRecord, SourceType};

fn video(id: &str, views: f64) -> RawRecord {
    RawRecord {
        source_type: "video".to_string(),
        external_id: id.to_string(),
        title: format!("short {id}"),
        published_at: 0,
        metrics: HashMap::from([("views".to_string(), views)]),
    }
}

#[tokio::test]
async fn malformed_record_fails_alone() {
    let store = Arc::new(MemoryStore::new());
    let p = IdeaProcessor::new(store.clone(), ScoreWeights::default());

    let mut batch: Vec<RawRecord> = (0..5).map(|i| video(&format!("v{i}"), 100.0)).collect();
    batch[2].metrics.insert("likes".to_string(), -7.0);

    let summary = p.process(batch).await;
    assert_eq!(summary.created, 4);
    assert_eq!(summary.failed.len(), 1);
    // the offender is identifiable by position and id
    assert_eq!(summary.failed[0].index, 2);
    assert_eq!(summary.failed[0].external_id.as_deref(), Some("v2"));
    assert!(summary.failed[0].reason.contains("likes"));
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn missing_required_fields_are_validation_failures() {
    let store = Arc::new(MemoryStore::new());
    let p = IdeaProcessor::new(store.clone(), ScoreWeights::default());

    let mut no_id = video("", 10.0);
    no_id.external_id = String::new();
    let mut no_source = video("ok-id", 10.0);
    no_source.source_type = String::new();

    let summary = p.process(vec![no_id, no_source, video("good", 10.0)]).await;
    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed.len(), 2);
    assert!(summary.failed[0].reason.contains("external_id"));
    assert!(summary.failed[1].reason.contains("source_type"));
}

/// Store double that rejects writes for one specific id.
struct RejectingStore {
    inner: MemoryStore,
    reject_id: String,
}

#[async_trait]
impl IdeaStore for RejectingStore {
    async fn get(
        &self,
        source_type: SourceType,
        external_id: &str,
    ) -> Result<Option<IdeaRecord>, StoreError> {
        self.inner.get(source_type, external_id).await
    }

    async fn upsert(&self, record: IdeaRecord) -> Result<(), StoreError> {
        if record.external_id == self.reject_id {
            return Err(StoreError("write rejected".to_string()));
        }
        self.inner.upsert(record).await
    }

    async fn query_recent(&self, since: u64) -> Result<Vec<IdeaRecord>, StoreError> {
        self.inner.query_recent(since).await
    }

    async fn top_by_score(&self, limit: usize) -> Result<Vec<IdeaRecord>, StoreError> {
        self.inner.query_recent(0).await.map(|mut v| {
            v.truncate(limit);
            v
        })
    }
}

#[tokio::test]
async fn persistence_failure_on_one_record_does_not_roll_back_others() {
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        reject_id: "v1".to_string(),
    });
    let p = IdeaProcessor::new(store.clone(), ScoreWeights::default());

    let summary = p
        .process(vec![video("v0", 1.0), video("v1", 1.0), video("v2", 1.0)])
        .await;
    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].index, 1);
    assert!(summary.failed[0].reason.contains("write rejected"));

    // v0 persisted before the failure and stays persisted
    assert!(store.get(SourceType::Video, "v0").await.unwrap().is_some());
    assert!(store.get(SourceType::Video, "v1").await.unwrap().is_none());
    assert!(store.get(SourceType::Video, "v2").await.unwrap().is_some());
}
