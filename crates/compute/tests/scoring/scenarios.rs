use chrono::Duration;

use fraudscore_compute::AnomalyMode;
use fraudscore_core::{RiskAppetiteProfile, ScoringError};
use fraudscore_rules::RuleId;

use crate::helpers::{clean_record, date, engine, varied_batch, SEED};

#[test]
fn single_high_value_record_without_fiscal_document() {
    let mut record = clean_record("DUP-1", 2_000_000.0);
    record.has_fiscal_document = false;
    record.due_date = record.issue_date + Duration::days(3);

    let result = engine()
        .score(&[record], &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    let scored = &result.records[0];

    let ids: Vec<RuleId> = scored.findings.iter().map(|f| f.rule_id).collect();
    assert_eq!(
        ids,
        vec![RuleId::MissingFiscalDocument, RuleId::ExtremeValue, RuleId::InadequateTerm]
    );
    assert_eq!(scored.rule_score, 1.0);
    assert_eq!(scored.risk_score, 1.0);
    assert!(scored.is_suspicious);
    assert_eq!(scored.fraud_reasons.len(), 3);
    assert!(result.summary.degraded);
}

#[test]
fn empty_batch_is_invalid() {
    let err = engine()
        .score(&[], &RiskAppetiteProfile::default(), SEED)
        .unwrap_err();
    assert!(matches!(err, ScoringError::InvalidBatch(_)));
    assert_eq!(err.code(), "INVALID_BATCH");
}

#[test]
fn ml_disabled_uses_rule_score_only() {
    let profile = RiskAppetiteProfile {
        enable_ml_detection: false,
        ..RiskAppetiteProfile::default()
    };
    let result = engine().score(&varied_batch(40), &profile, SEED).unwrap();

    assert_eq!(result.summary.anomaly_mode, AnomalyMode::Disabled);
    assert!(!result.summary.degraded);
    for r in &result.records {
        assert_eq!(r.anomaly_score, 0.0);
        assert_eq!(r.risk_score, r.rule_score);
    }
}

#[test]
fn few_near_identical_records_bypass_model() {
    let records: Vec<_> = (0..5)
        .map(|i| clean_record(&format!("DUP-{}", i), 15_250.0 + i as f64 * 0.01))
        .collect();
    let result = engine()
        .score(&records, &RiskAppetiteProfile::default(), SEED)
        .unwrap();

    assert_eq!(
        result.summary.anomaly_mode,
        AnomalyMode::Bypassed { available: 5, required: 10 }
    );
    assert!(result.summary.degraded);
    assert_eq!(result.summary.suspicious_count, 0);
    assert!(result.records.iter().all(|r| !r.is_suspicious));
}

#[test]
fn identical_records_fall_back_to_rules_when_fitting_fails() {
    let records: Vec<_> = (0..12)
        .map(|i| clean_record(&format!("DUP-{:02}", i), 15_250.37))
        .collect();
    let result = engine()
        .score(&records, &RiskAppetiteProfile::default(), SEED)
        .unwrap();

    assert!(matches!(
        result.summary.anomaly_mode,
        AnomalyMode::FittingFailed { .. }
    ));
    assert!(result.summary.degraded);
    assert_eq!(result.summary.total_records, 12);
    for r in &result.records {
        assert_eq!(r.anomaly_score, 0.0);
        assert_eq!(r.risk_score, r.rule_score);
        assert!(!r.is_suspicious);
    }
}

#[test]
fn mixed_batch_runs_model() {
    let result = engine()
        .score(&varied_batch(40), &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    assert_eq!(result.summary.anomaly_mode, AnomalyMode::Active);
    assert!(!result.summary.degraded);
    assert!(result
        .records
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.anomaly_score) && (0.0..=1.0).contains(&r.risk_score)));
    // The 5,000,000 record is both an extreme value and the clearest outlier.
    let big = &result.records[7];
    assert!(big.findings.iter().any(|f| f.rule_id == RuleId::ExtremeValue));
    assert!(big.anomaly_score > 0.5);
}

#[test]
fn due_date_before_issue_marks_evaluation_error() {
    let mut records = varied_batch(20);
    records[3].due_date = records[3].issue_date - Duration::days(1);

    let result = engine()
        .score(&records, &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    let broken = &result.records[3];
    assert!(broken.evaluation_error.is_some());
    assert_eq!(broken.anomaly_score, 0.0);
    assert_eq!(broken.risk_score, broken.rule_score);
    assert!(broken.findings.iter().any(|f| f.rule_id == RuleId::InadequateTerm));

    assert_eq!(result.summary.evaluation_errors, 1);
    assert_eq!(result.summary.anomaly_mode, AnomalyMode::Active);
    assert_eq!(
        result.records.iter().filter(|r| r.evaluation_error.is_some()).count(),
        1
    );
}

#[test]
fn weekend_round_value_record() {
    let mut record = clean_record("DUP-1", 50_000.0);
    record.issue_date = date(2024, 1, 13);
    record.due_date = date(2024, 2, 12);
    let result = engine()
        .score(&[record], &RiskAppetiteProfile::default(), SEED)
        .unwrap();
    let scored = &result.records[0];
    assert!((scored.rule_score - 0.7).abs() < 1e-12);
    assert!(scored.is_suspicious);
    assert_eq!(result.summary.top_reasons.len(), 2);
}
