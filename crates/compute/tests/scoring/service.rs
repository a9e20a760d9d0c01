use fraudscore_compute::{RecordFilter, TenantScoringService};
use fraudscore_core::{RiskAppetiteProfile, ScoringError, Sensitivity};

use crate::helpers::{engine, varied_batch};

fn service() -> TenantScoringService<
    fraudscore_compute::InMemoryProfileStore,
    fraudscore_compute::InMemoryResultRepository,
> {
    TenantScoringService::in_memory(engine())
}

#[test]
fn unknown_tenant_gets_default_profile() {
    let svc = service();
    let profile = svc.risk_appetite("tenant-a").unwrap();
    assert_eq!(profile, RiskAppetiteProfile::default());
    assert_eq!(profile.sensitivity, Sensitivity::Medium);
}

#[test]
fn invalid_update_keeps_previous_profile() {
    let svc = service();
    let high = RiskAppetiteProfile::with_sensitivity(Sensitivity::High);
    svc.update_risk_appetite("tenant-a", high.clone()).unwrap();

    let bad = RiskAppetiteProfile {
        threshold: Some(3.0),
        ..RiskAppetiteProfile::default()
    };
    let err = svc.update_risk_appetite("tenant-a", bad).unwrap_err();
    assert!(matches!(err, ScoringError::Configuration(_)));
    assert_eq!(svc.risk_appetite("tenant-a").unwrap(), high);
}

#[test]
fn profiles_are_isolated_per_tenant() {
    let svc = service();
    svc.update_risk_appetite("tenant-a", RiskAppetiteProfile::with_sensitivity(Sensitivity::Low))
        .unwrap();
    assert_eq!(svc.risk_appetite("tenant-b").unwrap().sensitivity, Sensitivity::Medium);
}

#[test]
fn process_batch_stores_results() {
    let svc = service();
    let report = svc.process_batch("tenant-a", &varied_batch(30)).unwrap();
    assert_eq!(report.total_records, 30);
    assert_eq!(report.tenant, "tenant-a");
    assert!(report.processing_time_ms >= 0.0);

    let all = svc.scored_records("tenant-a", RecordFilter::default()).unwrap();
    assert_eq!(all.len(), 30);
    let suspicious = svc
        .scored_records("tenant-a", RecordFilter { suspicious_only: true })
        .unwrap();
    assert_eq!(suspicious.len(), report.suspicious_count);
    assert!(suspicious.iter().all(|r| r.is_suspicious));

    assert_eq!(svc.summary("tenant-a").unwrap(), report.summary);
    assert!(!svc.trends("tenant-a").unwrap().monthly.is_empty());
}

#[test]
fn new_batch_replaces_previous() {
    let svc = service();
    svc.process_batch("tenant-a", &varied_batch(30)).unwrap();
    svc.process_batch("tenant-a", &varied_batch(12)).unwrap();
    assert_eq!(svc.summary("tenant-a").unwrap().total_records, 12);
}

#[test]
fn rejected_batch_leaves_store_untouched() {
    let svc = service();
    svc.process_batch("tenant-a", &varied_batch(15)).unwrap();
    let err = svc.process_batch("tenant-a", &[]).unwrap_err();
    assert!(matches!(err, ScoringError::InvalidBatch(_)));
    assert_eq!(svc.summary("tenant-a").unwrap().total_records, 15);
}

#[test]
fn tenant_without_batch_has_empty_views() {
    let svc = service();
    let summary = svc.summary("nobody").unwrap();
    assert_eq!(summary.total_records, 0);
    assert_eq!(summary.suspicious_percentage, 0.0);
    assert!(svc.scored_records("nobody", RecordFilter::default()).unwrap().is_empty());
    assert!(svc.trends("nobody").unwrap().daily.is_empty());
}

#[test]
fn higher_sensitivity_flags_at_least_as_many() {
    let svc = service();
    let batch = varied_batch(40);
    svc.update_risk_appetite("tenant-a", RiskAppetiteProfile::with_sensitivity(Sensitivity::Low))
        .unwrap();
    let low = svc.process_batch("tenant-a", &batch).unwrap().suspicious_count;
    svc.update_risk_appetite("tenant-a", RiskAppetiteProfile::with_sensitivity(Sensitivity::High))
        .unwrap();
    let high = svc.process_batch("tenant-a", &batch).unwrap().suspicious_count;
    assert!(low <= high);
}

#[test]
fn scored_record_serializes_flat() {
    let svc = service();
    svc.process_batch("tenant-a", &varied_batch(12)).unwrap();
    let records = svc.scored_records("tenant-a", RecordFilter::default()).unwrap();
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["id"], "DUP-0000");
    assert!(json["risk_score"].is_number());
    assert_eq!(json["issue_date"], "2024-01-01");
}
