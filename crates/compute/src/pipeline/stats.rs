//! Batch summary statistics over scored records.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use fraudscore_rules::RuleId;

use super::aggregate::{ScoredRecord, ANOMALY_REASON};
use super::anomaly::population::percentile;
use super::anomaly::AnomalyMode;
use super::trend::{trend_report, TrendReport};

/// A fraud reason and how many suspicious records carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawerBreakdown {
    pub drawer: String,
    pub count: usize,
    pub suspicious_count: usize,
    /// Percentage, 0-100.
    pub suspicious_rate: f64,
    pub total_value: f64,
    pub average_risk: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueDistribution {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q25: f64,
    pub q75: f64,
}

/// Batch-level statistics. Percentages are 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub suspicious_count: usize,
    pub suspicious_percentage: f64,
    pub without_fiscal_document: usize,
    pub average_risk_score: f64,
    pub total_value: f64,
    pub suspicious_value: f64,
    pub suspicious_value_percentage: f64,
    pub top_reasons: Vec<ReasonCount>,
    pub drawers: Vec<DrawerBreakdown>,
    pub anomaly_mode: AnomalyMode,
    /// Model was wanted but did not contribute.
    pub degraded: bool,
    pub evaluation_errors: usize,
    pub rule_set_version: String,
    pub value_distribution: Option<ValueDistribution>,
    pub trends: TrendReport,
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Tie-break rank of a reason: the rule that produced it, with the anomaly
/// reason after every rule.
fn reason_rank(records: &[ScoredRecord]) -> HashMap<&str, usize> {
    let mut ranks = HashMap::new();
    for r in records {
        for f in &r.findings {
            ranks.entry(f.explanation.as_str()).or_insert(f.rule_id.rank());
        }
    }
    ranks.insert(ANOMALY_REASON, RuleId::ALL.len());
    ranks
}

#[derive(Default)]
struct DrawerAccumulator {
    count: usize,
    suspicious: usize,
    total_value: f64,
    risk_sum: f64,
    risk_count: usize,
}

/// Summarize scored records. Records with an evaluation error count toward
/// totals but not toward risk averages.
pub fn summarize(
    records: &[ScoredRecord],
    anomaly_mode: &AnomalyMode,
    rule_set_version: &str,
    top_n: usize,
) -> BatchSummary {
    let mut suspicious_count = 0;
    let mut without_fiscal_document = 0;
    let mut evaluation_errors = 0;
    let mut total_value = 0.0;
    let mut suspicious_value = 0.0;
    let mut risk_sum = 0.0;
    let mut reason_counts: HashMap<&str, usize> = HashMap::new();
    let mut drawers: BTreeMap<&str, DrawerAccumulator> = BTreeMap::new();

    for r in records {
        let acc = drawers.entry(r.record.drawer.as_str()).or_default();
        acc.count += 1;
        acc.total_value += r.record.value;
        total_value += r.record.value;
        if !r.record.has_fiscal_document {
            without_fiscal_document += 1;
        }
        if r.has_evaluation_error() {
            evaluation_errors += 1;
        } else {
            risk_sum += r.risk_score;
            acc.risk_sum += r.risk_score;
            acc.risk_count += 1;
        }
        if r.is_suspicious {
            suspicious_count += 1;
            suspicious_value += r.record.value;
            acc.suspicious += 1;
            for reason in &r.fraud_reasons {
                *reason_counts.entry(reason.as_str()).or_default() += 1;
            }
        }
    }

    let ranks = reason_rank(records);
    let mut top_reasons: Vec<(&str, usize)> = reason_counts.into_iter().collect();
    top_reasons.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| {
                let ra = ranks.get(a.0).copied().unwrap_or(usize::MAX);
                let rb = ranks.get(b.0).copied().unwrap_or(usize::MAX);
                ra.cmp(&rb)
            })
            .then_with(|| a.0.cmp(b.0))
    });
    top_reasons.truncate(top_n);

    let scored_count = records.len() - evaluation_errors;
    let drawers: Vec<DrawerBreakdown> = drawers
        .into_iter()
        .map(|(name, acc)| DrawerBreakdown {
            drawer: name.to_string(),
            count: acc.count,
            suspicious_count: acc.suspicious,
            suspicious_rate: percentage(acc.suspicious as f64, acc.count as f64),
            total_value: acc.total_value,
            average_risk: if acc.risk_count > 0 {
                acc.risk_sum / acc.risk_count as f64
            } else {
                0.0
            },
        })
        .collect();

    BatchSummary {
        total_records: records.len(),
        suspicious_count,
        suspicious_percentage: percentage(suspicious_count as f64, records.len() as f64),
        without_fiscal_document,
        average_risk_score: if scored_count > 0 {
            risk_sum / scored_count as f64
        } else {
            0.0
        },
        total_value,
        suspicious_value,
        suspicious_value_percentage: percentage(suspicious_value, total_value),
        top_reasons: top_reasons
            .into_iter()
            .map(|(reason, count)| ReasonCount {
                reason: reason.to_string(),
                count,
            })
            .collect(),
        drawers,
        anomaly_mode: anomaly_mode.clone(),
        degraded: anomaly_mode.is_degraded(),
        evaluation_errors,
        rule_set_version: rule_set_version.to_string(),
        value_distribution: value_distribution(records),
        trends: trend_report(records),
    }
}

fn value_distribution(records: &[ScoredRecord]) -> Option<ValueDistribution> {
    if records.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = records.iter().map(|r| r.record.value).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    Some(ValueDistribution {
        min: values[0],
        max: values[values.len() - 1],
        median: percentile(&values, 0.5),
        q25: percentile(&values, 0.25),
        q75: percentile(&values, 0.75),
    })
}
