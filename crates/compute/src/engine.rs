use serde::Serialize;
use tracing::{debug, info};

use fraudscore_core::{validate_records, Config, DuplicateRecord, Result, RiskAppetiteProfile, ScoringError};
use fraudscore_rules::{RuleEvaluator, RuleSpec};

use crate::pipeline::aggregate::{aggregate, AggregationContext, ScoredRecord};
use crate::pipeline::anomaly::detect;
use crate::pipeline::features::{extract_features, DrawerHistoryMap};
use crate::pipeline::metrics::{timed, StageTimer, StageTimings};
use crate::pipeline::stats::{summarize, BatchSummary};

/// Output of one scoring run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Scored records in input order.
    pub records: Vec<ScoredRecord>,
    pub summary: BatchSummary,
    pub timings: StageTimings,
}

/// Stateless fraud scoring engine.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and tenants. The risk appetite profile and seed are supplied per
/// call.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: Config,
    rules: RuleSpec,
}

impl ScoringEngine {
    pub fn new(config: Config, rules: RuleSpec) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &RuleSpec {
        &self.rules
    }

    /// Score a batch with the configured default seed.
    pub fn score_default_seed(
        &self,
        records: &[DuplicateRecord],
        profile: &RiskAppetiteProfile,
    ) -> Result<BatchResult> {
        self.score(records, profile, self.config.engine.seed)
    }

    pub fn score(
        &self,
        records: &[DuplicateRecord],
        profile: &RiskAppetiteProfile,
        seed: u64,
    ) -> Result<BatchResult> {
        self.run(records, profile, seed, None)
    }

    /// Score a batch, adding historical drawer features to the model input.
    pub fn score_with_history(
        &self,
        records: &[DuplicateRecord],
        profile: &RiskAppetiteProfile,
        seed: u64,
        history: &DrawerHistoryMap,
    ) -> Result<BatchResult> {
        self.run(records, profile, seed, Some(history))
    }

    fn check_batch(&self, records: &[DuplicateRecord], profile: &RiskAppetiteProfile) -> Result<()> {
        if records.is_empty() {
            return Err(ScoringError::InvalidBatch("batch is empty".to_string()));
        }
        let max = self.config.engine.max_batch_size;
        if records.len() > max {
            return Err(ScoringError::InvalidBatch(format!(
                "batch of {} records exceeds the maximum of {}",
                records.len(),
                max
            )));
        }
        validate_records(records)?;
        profile.validate()
    }

    fn run(
        &self,
        records: &[DuplicateRecord],
        profile: &RiskAppetiteProfile,
        seed: u64,
        history: Option<&DrawerHistoryMap>,
    ) -> Result<BatchResult> {
        let total = StageTimer::start();
        self.check_batch(records, profile)?;

        let (features, features_ms) = timed(|| extract_features(records, history));
        let stats = &features.statistics;
        debug!(
            records = records.len(),
            mean_value = stats.mean_value,
            std_value = stats.std_value,
            drawers = stats.drawer_count,
            drawees = stats.drawee_count,
            document_types = stats.document_type_count,
            elapsed_ms = features_ms,
            "features extracted"
        );

        let thresholds = &profile.custom_thresholds;
        let ((rules, rules_ms), (anomaly, anomaly_ms)) = rayon::join(
            || timed(|| RuleEvaluator::evaluate_batch(&self.rules, thresholds, records)),
            || {
                timed(|| {
                    detect(
                        &features,
                        &self.config.anomaly,
                        profile.enable_ml_detection,
                        seed,
                    )
                })
            },
        );

        let ctx = AggregationContext {
            profile,
            blend: &self.config.blend,
            trigger_cutoff: self.config.anomaly.trigger_cutoff,
        };
        let (scored, aggregate_ms) =
            timed(|| aggregate(records, &features.vectors, rules, &anomaly, &ctx));

        let (summary, stats_ms) = timed(|| {
            summarize(
                &scored,
                &anomaly.mode,
                &self.rules.version,
                self.config.engine.top_reasons,
            )
        });

        let timings = StageTimings {
            features_ms,
            rules_ms,
            anomaly_ms,
            aggregate_ms,
            stats_ms,
            total_ms: total.finish(),
        };
        info!(
            records = summary.total_records,
            suspicious = summary.suspicious_count,
            evaluation_errors = summary.evaluation_errors,
            anomaly_mode = ?summary.anomaly_mode,
            elapsed_ms = timings.total_ms,
            "batch scored"
        );

        Ok(BatchResult {
            records: scored,
            summary,
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(Config::default(), RuleSpec::default()).unwrap()
    }

    fn record(id: &str) -> DuplicateRecord {
        DuplicateRecord {
            id: id.to_string(),
            drawer: "Acme".to_string(),
            drawee: "Client".to_string(),
            value: 4321.0,
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            document_type: "Duplicata".to_string(),
            has_fiscal_document: true,
            status: "Active".to_string(),
        }
    }

    #[test]
    fn empty_batch_rejected() {
        let err = engine().score(&[], &RiskAppetiteProfile::default(), 1).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidBatch(_)));
    }

    #[test]
    fn oversized_batch_rejected() {
        let mut config = Config::default();
        config.engine.max_batch_size = 1;
        let engine = ScoringEngine::new(config, RuleSpec::default()).unwrap();
        let err = engine
            .score(&[record("a"), record("b")], &RiskAppetiteProfile::default(), 1)
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidBatch(_)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = engine()
            .score(&[record("a"), record("a")], &RiskAppetiteProfile::default(), 1)
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidRecord { .. }));
    }

    #[test]
    fn invalid_profile_rejected() {
        let profile = RiskAppetiteProfile {
            threshold: Some(-0.1),
            ..RiskAppetiteProfile::default()
        };
        let err = engine().score(&[record("a")], &profile, 1).unwrap_err();
        assert!(matches!(err, ScoringError::Configuration(_)));
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = Config::default();
        config.anomaly.n_trees = 0;
        assert!(ScoringEngine::new(config, RuleSpec::default()).is_err());
    }

    #[test]
    fn summary_carries_rule_version() {
        let result = engine().score(&[record("a")], &RiskAppetiteProfile::default(), 1).unwrap();
        assert_eq!(result.summary.rule_set_version, "1");
        assert_eq!(result.records.len(), 1);
        assert!(result.timings.total_ms >= 0.0);
    }
}
