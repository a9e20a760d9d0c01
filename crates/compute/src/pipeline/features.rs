//! Feature extraction for duplicate records.
//!
//! Every batch-relative statistic is accumulated over the records sorted by
//! id, so permuting the input leaves every feature bit unchanged.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use fraudscore_core::DuplicateRecord;

use super::anomaly::population::{mean_and_std, z_score};

/// Historical aggregates for one drawer, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawerHistory {
    pub mean_value: f64,
    pub record_count: usize,
    /// Share of past records flagged suspicious, in [0, 1].
    pub suspicious_rate: f64,
}

/// Drawer name → historical aggregates.
pub type DrawerHistoryMap = HashMap<String, DrawerHistory>;

/// Numeric features for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub value: f64,
    pub log_value: f64,
    pub value_zscore: f64,
    pub days_to_due: f64,
    pub weekend_issue: f64,
    pub drawer_frequency: f64,
    pub drawee_frequency: f64,
    pub document_type_frequency: f64,
    pub drawer_mean_value: f64,
    pub drawer_fiscal_rate: f64,
    pub drawer_deviation: f64,
    pub value_per_day: f64,
    pub missing_fiscal: f64,
    /// `(value / historical mean, historical suspicious rate)` when history
    /// was supplied for the batch.
    pub history: Option<(f64, f64)>,
}

impl FeatureVector {
    /// Name of the first non-finite feature, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let mut named = vec![
            ("value", self.value),
            ("log_value", self.log_value),
            ("value_zscore", self.value_zscore),
            ("drawer_deviation", self.drawer_deviation),
            ("value_per_day", self.value_per_day),
        ];
        if let Some((ratio, rate)) = self.history {
            named.push(("history_value_ratio", ratio));
            named.push(("history_suspicious_rate", rate));
        }
        named.into_iter().find(|(_, v)| !v.is_finite()).map(|(n, _)| n)
    }

    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Flatten into the model's input row.
    pub fn to_row(&self) -> Vec<f64> {
        let mut row = vec![
            self.value,
            self.log_value,
            self.value_zscore,
            self.days_to_due,
            self.weekend_issue,
            self.drawer_frequency,
            self.drawee_frequency,
            self.document_type_frequency,
            self.drawer_mean_value,
            self.drawer_fiscal_rate,
            self.drawer_deviation,
            self.value_per_day,
            self.missing_fiscal,
        ];
        if let Some((ratio, rate)) = self.history {
            row.push(ratio);
            row.push(rate);
        }
        row
    }
}

/// Batch-level aggregates the per-record features are derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub mean_value: f64,
    pub std_value: f64,
    pub drawer_count: usize,
    pub drawee_count: usize,
    pub document_type_count: usize,
}

/// Output of the extractor.
#[derive(Debug, Clone)]
pub struct BatchFeatures {
    /// One vector per record, in input order.
    pub vectors: Vec<FeatureVector>,
    /// Input indices sorted by record id.
    pub canonical_order: Vec<usize>,
    pub statistics: BatchStatistics,
}

#[derive(Default)]
struct DrawerAccumulator {
    count: usize,
    value_sum: f64,
    fiscal_count: usize,
}

/// Derive features for a non-empty batch.
pub fn extract_features(
    records: &[DuplicateRecord],
    history: Option<&DrawerHistoryMap>,
) -> BatchFeatures {
    let mut canonical_order: Vec<usize> = (0..records.len()).collect();
    canonical_order.sort_by(|&a, &b| records[a].id.cmp(&records[b].id));

    let values: Vec<f64> = canonical_order.iter().map(|&i| records[i].value).collect();
    let (mean_value, std_value) = mean_and_std(&values);

    let mut drawers: BTreeMap<&str, DrawerAccumulator> = BTreeMap::new();
    let mut drawees: HashMap<&str, usize> = HashMap::new();
    let mut doc_types: HashMap<&str, usize> = HashMap::new();
    for &i in &canonical_order {
        let r = &records[i];
        let acc = drawers.entry(r.drawer.as_str()).or_default();
        acc.count += 1;
        acc.value_sum += r.value;
        if r.has_fiscal_document {
            acc.fiscal_count += 1;
        }
        *drawees.entry(r.drawee.as_str()).or_default() += 1;
        *doc_types.entry(r.document_type.as_str()).or_default() += 1;
    }

    let vectors = records
        .iter()
        .map(|r| {
            // Every drawer was inserted above.
            let acc = &drawers[r.drawer.as_str()];
            let drawer_mean = acc.value_sum / acc.count as f64;
            let days = r.days_to_due();
            FeatureVector {
                value: r.value,
                log_value: r.value.ln_1p(),
                value_zscore: z_score(r.value, mean_value, std_value),
                days_to_due: days as f64,
                weekend_issue: if r.issued_on_weekend() { 1.0 } else { 0.0 },
                drawer_frequency: acc.count as f64,
                drawee_frequency: drawees[r.drawee.as_str()] as f64,
                document_type_frequency: doc_types[r.document_type.as_str()] as f64,
                drawer_mean_value: drawer_mean,
                drawer_fiscal_rate: acc.fiscal_count as f64 / acc.count as f64,
                drawer_deviation: (r.value - drawer_mean).abs(),
                value_per_day: r.value / (days + 1) as f64,
                missing_fiscal: if r.has_fiscal_document { 0.0 } else { 1.0 },
                history: history.map(|h| history_features(r, h)),
            }
        })
        .collect();

    BatchFeatures {
        vectors,
        canonical_order,
        statistics: BatchStatistics {
            mean_value,
            std_value,
            drawer_count: drawers.len(),
            drawee_count: drawees.len(),
            document_type_count: doc_types.len(),
        },
    }
}

/// Drawers without history look like their own baseline: ratio 1, rate 0.
fn history_features(record: &DuplicateRecord, history: &DrawerHistoryMap) -> (f64, f64) {
    match history.get(&record.drawer) {
        Some(h) if h.record_count > 0 && h.mean_value > 0.0 => {
            (record.value / h.mean_value, h.suspicious_rate)
        }
        _ => (1.0, 0.0),
    }
}
