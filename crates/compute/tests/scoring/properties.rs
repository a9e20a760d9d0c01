use std::collections::HashMap;

use fraudscore_compute::{DrawerHistory, DrawerHistoryMap};
use fraudscore_core::{RiskAppetiteProfile, Sensitivity};

use crate::helpers::{clean_record, engine, varied_batch, SEED};

#[test]
fn scores_are_permutation_invariant() {
    let records = varied_batch(60);
    let profile = RiskAppetiteProfile::default();
    let forward = engine().score(&records, &profile, SEED).unwrap();

    let mut shuffled = records.clone();
    shuffled.reverse();
    shuffled.rotate_left(17);
    let permuted = engine().score(&shuffled, &profile, SEED).unwrap();

    let by_id: HashMap<&str, (f64, f64, bool)> = permuted
        .records
        .iter()
        .map(|r| (r.record.id.as_str(), (r.risk_score, r.anomaly_score, r.is_suspicious)))
        .collect();
    for r in &forward.records {
        assert_eq!(
            by_id[r.record.id.as_str()],
            (r.risk_score, r.anomaly_score, r.is_suspicious),
            "record {} changed under permutation",
            r.record.id
        );
    }
    assert_eq!(forward.summary.suspicious_count, permuted.summary.suspicious_count);
    assert_eq!(forward.summary.top_reasons, permuted.summary.top_reasons);
}

#[test]
fn same_seed_reproduces_scores() {
    let records = varied_batch(40);
    let profile = RiskAppetiteProfile::default();
    let a = engine().score(&records, &profile, 7).unwrap();
    let b = engine().score(&records, &profile, 7).unwrap();
    let scores = |r: &fraudscore_compute::BatchResult| -> Vec<f64> {
        r.records.iter().map(|s| s.risk_score).collect()
    };
    assert_eq!(scores(&a), scores(&b));
}

#[test]
fn output_keeps_input_order() {
    let records = varied_batch(25);
    let result = engine()
        .score(&records, &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    let ids: Vec<&str> = result.records.iter().map(|r| r.record.id.as_str()).collect();
    let expected: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn higher_risk_is_suspicious_whenever_lower_is() {
    let result = engine()
        .score(&varied_batch(50), &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    for a in &result.records {
        for b in &result.records {
            if a.risk_score > b.risk_score && b.is_suspicious {
                assert!(a.is_suspicious);
            }
        }
    }
}

#[test]
fn sensitivity_never_reduces_suspicious_count() {
    let records = varied_batch(50);
    let count = |s: Sensitivity| {
        engine()
            .score(&records, &RiskAppetiteProfile::with_sensitivity(s), SEED)
            .unwrap()
            .summary
            .suspicious_count
    };
    let (low, medium, high) = (
        count(Sensitivity::Low),
        count(Sensitivity::Medium),
        count(Sensitivity::High),
    );
    assert!(low <= medium, "low={} medium={}", low, medium);
    assert!(medium <= high, "medium={} high={}", medium, high);
}

#[test]
fn summary_count_matches_flags() {
    let result = engine()
        .score(&varied_batch(50), &RiskAppetiteProfile::with_sensitivity(Sensitivity::High), SEED)
        .unwrap();
    let flagged = result.records.iter().filter(|r| r.is_suspicious).count();
    assert_eq!(result.summary.suspicious_count, flagged);
    let expected = flagged as f64 / result.records.len() as f64 * 100.0;
    assert!((result.summary.suspicious_percentage - expected).abs() < 1e-9);
}

#[test]
fn extra_rule_never_lowers_risk() {
    let profile = RiskAppetiteProfile {
        enable_ml_detection: false,
        ..RiskAppetiteProfile::default()
    };
    let clean = clean_record("DUP-1", 15_250.0);
    let mut flagged = clean.clone();
    flagged.has_fiscal_document = false;

    let base = engine().score(&[clean], &profile, SEED).unwrap();
    let more = engine().score(&[flagged], &profile, SEED).unwrap();
    assert!(more.records[0].risk_score >= base.records[0].risk_score);
    assert!(more.records[0].findings.len() > base.records[0].findings.len());
}

#[test]
fn drawer_history_feeds_the_model() {
    let records = varied_batch(30);
    let mut history = DrawerHistoryMap::new();
    history.insert(
        "Acme Ltda".to_string(),
        DrawerHistory { mean_value: 2_000.0, record_count: 120, suspicious_rate: 0.05 },
    );
    let result = engine()
        .score_with_history(&records, &RiskAppetiteProfile::default(), SEED, &history)
        .unwrap();
    assert!(result.summary.anomaly_mode.is_active());
    assert_eq!(result.records.len(), 30);
}
