pub mod engine;
pub mod pipeline;
pub mod service;

pub use engine::{BatchResult, ScoringEngine};
pub use pipeline::{
    AnomalyMode, BatchSummary, DrawerBreakdown, DrawerHistory, DrawerHistoryMap, ReasonCount,
    ScoredRecord, StageTimings, TrendBucket, TrendReport, ValueDistribution,
};
pub use service::{
    BatchReport, InMemoryProfileStore, InMemoryResultRepository, ProfileStore, RecordFilter,
    ResultRepository, StoredBatch, TenantScoringService,
};
