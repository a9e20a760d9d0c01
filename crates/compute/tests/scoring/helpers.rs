use chrono::{Duration, NaiveDate};

use fraudscore_compute::ScoringEngine;
use fraudscore_core::{Config, DuplicateRecord};
use fraudscore_rules::RuleSpec;

pub const SEED: u64 = 42;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn engine() -> ScoringEngine {
    ScoringEngine::new(Config::default(), RuleSpec::default()).unwrap()
}

/// A record no rule fires on: Monday issue, 30-day term, fiscal document,
/// mid-range non-round value.
pub fn clean_record(id: &str, value: f64) -> DuplicateRecord {
    let issue = date(2024, 1, 15);
    DuplicateRecord {
        id: id.to_string(),
        drawer: "Acme Ltda".to_string(),
        drawee: "Client SA".to_string(),
        value,
        issue_date: issue,
        due_date: issue + Duration::days(30),
        document_type: "Duplicata Mercantil".to_string(),
        has_fiscal_document: true,
        status: "Active".to_string(),
    }
}

/// Deterministic mixed batch: several drawers, spread dates, a few missing
/// fiscal documents, one very large value and one very short term.
pub fn varied_batch(n: usize) -> Vec<DuplicateRecord> {
    let drawers = ["Acme Ltda", "Beta Comercio", "Gamma Industria", "Delta Servicos"];
    (0..n)
        .map(|i| {
            let issue = date(2024, 1, 1) + Duration::days((i * 3 % 50) as i64);
            let term = 20 + (i * 11 % 45) as i64;
            DuplicateRecord {
                id: format!("DUP-{:04}", i),
                drawer: drawers[i % drawers.len()].to_string(),
                drawee: format!("Client {}", i % 6),
                value: 1500.0 + ((i * 7919) % 25_000) as f64 + 0.37,
                issue_date: issue,
                due_date: issue + Duration::days(term),
                document_type: (if i % 5 == 0 { "Duplicata Servico" } else { "Duplicata Mercantil" })
                    .to_string(),
                has_fiscal_document: i % 9 != 0,
                status: "Active".to_string(),
            }
        })
        .enumerate()
        .map(|(i, mut r)| {
            if i == 7 {
                r.value = 5_000_000.0;
            }
            if i == 13 {
                r.due_date = r.issue_date + Duration::days(2);
            }
            r
        })
        .collect()
}
