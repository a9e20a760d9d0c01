//! Anomaly scoring stage.
//!
//! Fits an isolation forest on the batch itself and reports one normalized
//! score per record. When the model does not run, the reason is carried in
//! [`AnomalyMode`] so a bypass is never mistaken for a genuine zero.
//!
//! Sub-modules:
//! - [`forest`]: the isolation forest
//! - [`population`]: mean, spread, ranges and percentiles

pub mod forest;
pub mod population;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fraudscore_core::AnomalyConfig;

use super::features::BatchFeatures;
pub use forest::{normalize, ForestError, IsolationForest};

/// Whether and how the anomaly model contributed to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnomalyMode {
    /// Model fitted and scored.
    Active,
    /// Turned off by the risk appetite profile.
    #[default]
    Disabled,
    /// Too few usable records to fit.
    Bypassed { available: usize, required: usize },
    /// Fitting was attempted and failed; rules only.
    FittingFailed { reason: String },
}

impl AnomalyMode {
    pub fn is_active(&self) -> bool {
        matches!(self, AnomalyMode::Active)
    }

    /// True when the model was wanted but could not contribute.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            AnomalyMode::Bypassed { .. } | AnomalyMode::FittingFailed { .. }
        )
    }
}

/// Per-record anomaly scores (input order) plus the mode that produced them.
#[derive(Debug, Clone)]
pub struct AnomalyOutcome {
    pub mode: AnomalyMode,
    pub scores: Vec<f64>,
}

impl AnomalyOutcome {
    fn inactive(mode: AnomalyMode, len: usize) -> Self {
        Self {
            mode,
            scores: vec![0.0; len],
        }
    }
}

/// Run the anomaly stage. Records with non-finite features are left out of
/// the fit and keep a score of 0.
pub fn detect(
    features: &BatchFeatures,
    config: &AnomalyConfig,
    enabled: bool,
    seed: u64,
) -> AnomalyOutcome {
    let len = features.vectors.len();
    if !enabled {
        return AnomalyOutcome::inactive(AnomalyMode::Disabled, len);
    }

    let usable: Vec<usize> = features
        .canonical_order
        .iter()
        .copied()
        .filter(|&i| features.vectors[i].is_finite())
        .collect();
    if usable.len() < config.min_samples {
        debug!(
            available = usable.len(),
            required = config.min_samples,
            "anomaly model bypassed"
        );
        return AnomalyOutcome::inactive(
            AnomalyMode::Bypassed {
                available: usable.len(),
                required: config.min_samples,
            },
            len,
        );
    }

    let rows: Vec<Vec<f64>> = usable.iter().map(|&i| features.vectors[i].to_row()).collect();
    let forest = match IsolationForest::fit(&rows, config.n_trees, config.sample_size, seed) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, rows = rows.len(), "anomaly model fitting failed, scoring with rules only");
            return AnomalyOutcome::inactive(
                AnomalyMode::FittingFailed {
                    reason: e.to_string(),
                },
                len,
            );
        }
    };

    let normalized = normalize(&forest.score_all(&rows));
    let mut scores = vec![0.0; len];
    for (&i, score) in usable.iter().zip(normalized) {
        scores[i] = score;
    }
    debug!(rows = rows.len(), trees = forest.n_trees(), "anomaly model scored");

    AnomalyOutcome {
        mode: AnomalyMode::Active,
        scores,
    }
}
