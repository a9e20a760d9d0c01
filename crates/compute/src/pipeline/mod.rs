//! Scoring pipeline stages.
//!
//! - [`features`]: batch-relative feature vectors
//! - [`anomaly`]: isolation forest fitted on the batch
//! - [`aggregate`]: rule + anomaly blend, verdict and reasons
//! - [`stats`]: batch summary
//! - [`trend`]: daily and monthly buckets
//! - [`metrics`]: per-stage timings

pub mod aggregate;
pub mod anomaly;
pub mod features;
pub mod metrics;
pub mod stats;
pub mod trend;

pub use aggregate::{ScoredRecord, ANOMALY_REASON};
pub use anomaly::{AnomalyMode, AnomalyOutcome};
pub use features::{BatchFeatures, DrawerHistory, DrawerHistoryMap, FeatureVector};
pub use metrics::StageTimings;
pub use stats::{BatchSummary, DrawerBreakdown, ReasonCount, ValueDistribution};
pub use trend::{TrendBucket, TrendPeriod, TrendReport};
