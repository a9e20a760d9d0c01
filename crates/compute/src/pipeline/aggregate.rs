//! Risk aggregation: rule and anomaly signals → final verdict per record.

use serde::{Deserialize, Serialize};

use fraudscore_core::{BlendStrategy, DuplicateRecord, RiskAppetiteProfile};
use fraudscore_rules::{RuleEvaluation, RuleFinding};

use super::anomaly::AnomalyOutcome;
use super::features::FeatureVector;

/// Reason attached when the anomaly score exceeds the trigger cut-off.
pub const ANOMALY_REASON: &str = "Atypical pattern detected by anomaly model";

/// A record with its full verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: DuplicateRecord,
    pub findings: Vec<RuleFinding>,
    pub rule_score: f64,
    pub anomaly_score: f64,
    pub risk_score: f64,
    pub is_suspicious: bool,
    pub fraud_reasons: Vec<String>,
    /// Set when a derived feature was not finite; the record was scored on
    /// rules alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_error: Option<String>,
}

impl ScoredRecord {
    pub fn has_evaluation_error(&self) -> bool {
        self.evaluation_error.is_some()
    }
}

/// Parameters shared by every record of one aggregation run.
pub struct AggregationContext<'a> {
    pub profile: &'a RiskAppetiteProfile,
    pub blend: &'a BlendStrategy,
    pub trigger_cutoff: f64,
}

/// Merge per-record signals. All slices are in input order and equally long.
pub fn aggregate(
    records: &[DuplicateRecord],
    features: &[FeatureVector],
    rules: Vec<RuleEvaluation>,
    anomaly: &AnomalyOutcome,
    ctx: &AggregationContext<'_>,
) -> Vec<ScoredRecord> {
    let threshold = ctx.profile.effective_threshold();
    let model_active = anomaly.mode.is_active();

    records
        .iter()
        .zip(features)
        .zip(rules)
        .zip(&anomaly.scores)
        .map(|(((record, fv), eval), &anomaly_score)| {
            let evaluation_error = fv
                .first_non_finite()
                .map(|name| format!("non-finite feature: {}", name));
            let ml_active = model_active && evaluation_error.is_none();
            let anomaly_score = if ml_active { anomaly_score } else { 0.0 };

            let risk_score = ctx.blend.combine(eval.score, anomaly_score, ml_active);

            let mut fraud_reasons: Vec<String> =
                eval.findings.iter().map(|f| f.explanation.clone()).collect();
            if ml_active && anomaly_score > ctx.trigger_cutoff {
                fraud_reasons.push(ANOMALY_REASON.to_string());
            }

            ScoredRecord {
                record: record.clone(),
                rule_score: eval.score,
                findings: eval.findings,
                anomaly_score,
                risk_score,
                is_suspicious: risk_score >= threshold,
                fraud_reasons,
                evaluation_error,
            }
        })
        .collect()
}
