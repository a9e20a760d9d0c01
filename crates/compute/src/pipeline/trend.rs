//! Trend buckets over issue dates.
//!
//! Scored records are grouped by issue day and by issue month, split by the
//! suspicious flag. Buckets come out sorted by period, non-suspicious first.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::aggregate::ScoredRecord;

/// Bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Daily,
    Monthly,
}

impl TrendPeriod {
    fn key(self, record: &ScoredRecord) -> String {
        let date = record.record.issue_date;
        match self {
            TrendPeriod::Daily => date.format("%Y-%m-%d").to_string(),
            TrendPeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// `YYYY-MM-DD` or `YYYY-MM`.
    pub period: String,
    pub is_suspicious: bool,
    pub count: usize,
    pub total_value: f64,
    pub mean_risk: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub daily: Vec<TrendBucket>,
    pub monthly: Vec<TrendBucket>,
}

#[derive(Default)]
struct BucketAccumulator {
    count: usize,
    total_value: f64,
    risk_sum: f64,
    risk_count: usize,
}

/// Group records into buckets of the given granularity. Records with an
/// evaluation error count toward `count` and `total_value` only.
pub fn bucket_trends(records: &[ScoredRecord], period: TrendPeriod) -> Vec<TrendBucket> {
    let mut groups: BTreeMap<(String, bool), BucketAccumulator> = BTreeMap::new();
    for r in records {
        let acc = groups.entry((period.key(r), r.is_suspicious)).or_default();
        acc.count += 1;
        acc.total_value += r.record.value;
        if !r.has_evaluation_error() {
            acc.risk_sum += r.risk_score;
            acc.risk_count += 1;
        }
    }
    groups
        .into_iter()
        .map(|((period, is_suspicious), acc)| TrendBucket {
            period,
            is_suspicious,
            count: acc.count,
            total_value: acc.total_value,
            mean_risk: if acc.risk_count > 0 {
                acc.risk_sum / acc.risk_count as f64
            } else {
                0.0
            },
        })
        .collect()
}

pub fn trend_report(records: &[ScoredRecord]) -> TrendReport {
    TrendReport {
        daily: bucket_trends(records, TrendPeriod::Daily),
        monthly: bucket_trends(records, TrendPeriod::Monthly),
    }
}
