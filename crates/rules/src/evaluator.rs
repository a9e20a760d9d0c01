//! Deterministic rule evaluation.
//!
//! Every enabled rule is checked against every record, with no
//! short-circuiting. Findings come out in rule-id order and the rule score
//! is the sum of triggered weights, capped at 1.0.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use fraudscore_core::{CustomThresholds, DuplicateRecord};

use crate::schema::{RuleId, RuleSpec};

/// Multiple that a value must hit exactly to count as "round".
const ROUND_VALUE_UNIT: f64 = 1000.0;

/// A triggered rule on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule_id: RuleId,
    pub weight: f64,
    pub explanation: String,
}

/// All findings for one record plus the capped rule score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub findings: Vec<RuleFinding>,
    pub score: f64,
}

impl RuleEvaluation {
    pub fn triggered(&self, id: RuleId) -> bool {
        self.findings.iter().any(|f| f.rule_id == id)
    }
}

/// Check a single rule. Returns the explanation when it triggers.
fn check_rule(id: RuleId, record: &DuplicateRecord, t: &CustomThresholds) -> Option<String> {
    match id {
        RuleId::MissingFiscalDocument => {
            (!record.has_fiscal_document).then(|| "No linked fiscal document".to_string())
        }
        RuleId::ExtremeValue => {
            if record.value > t.high_value {
                Some(format!("Value above {:.2} (extreme value)", t.high_value))
            } else if record.value < t.low_value {
                Some(format!(
                    "Value below {:.2} (possible test transaction)",
                    t.low_value
                ))
            } else {
                None
            }
        }
        RuleId::InadequateTerm => {
            let days = record.days_to_due();
            if days < t.short_term_days {
                Some(format!("Payment term too short (< {} days)", t.short_term_days))
            } else if days > t.max_term_days {
                Some(format!("Payment term too long (> {} days)", t.max_term_days))
            } else {
                None
            }
        }
        RuleId::WeekendIssuance => record
            .issued_on_weekend()
            .then(|| "Issued on a weekend".to_string()),
        RuleId::RoundValue => {
            // Capped at high_value on purpose: values above it report ExtremeValue
            // and are excluded from this rule.
            let round = record.value % ROUND_VALUE_UNIT == 0.0;
            (round && record.value >= t.round_value_floor && record.value <= t.high_value)
                .then(|| "Round value pattern (exact multiple of 1,000)".to_string())
        }
    }
}

/// Stateless evaluator over a [`RuleSpec`].
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Evaluate every enabled rule against one record.
    pub fn evaluate(
        spec: &RuleSpec,
        thresholds: &CustomThresholds,
        record: &DuplicateRecord,
    ) -> RuleEvaluation {
        // `enabled_rules` is already in rule-id order.
        let findings: Vec<RuleFinding> = spec
            .enabled_rules()
            .filter_map(|rule| {
                check_rule(rule.id, record, thresholds).map(|explanation| RuleFinding {
                    rule_id: rule.id,
                    weight: rule.weight,
                    explanation,
                })
            })
            .collect();

        let score = findings.iter().map(|f| f.weight).sum::<f64>().min(1.0);
        RuleEvaluation { findings, score }
    }

    /// Evaluate a whole batch in parallel, preserving input order.
    pub fn evaluate_batch(
        spec: &RuleSpec,
        thresholds: &CustomThresholds,
        records: &[DuplicateRecord],
    ) -> Vec<RuleEvaluation> {
        records
            .par_iter()
            .map(|r| Self::evaluate(spec, thresholds, r))
            .collect()
    }
}
