// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod processor;
pub mod store;
pub mod universal;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::config::{HarvesterConfig, ScoreWeights};
pub use crate::ingest::types::{FetchError, FetchParams, RawRecord, SourcePlugin, SourceType};
pub use crate::ingest::{run_pass, HarvestSource, PassOutcome};
pub use crate::processor::{IdeaProcessor, ProcessingSummary};
pub use crate::store::{IdeaRecord, IdeaStore, MemoryStore};
pub use crate::universal::{normalize, NormalizeError, UniversalMetricVector};
