//! Tenant-facing scoring service.
//!
//! Wraps the stateless [`ScoringEngine`] with per-tenant profile storage and
//! result storage. Profile changes and batch outcomes are emitted as audit
//! events on the `audit` tracing target.

pub mod store;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use fraudscore_core::{DuplicateRecord, Result, RiskAppetiteProfile};

use crate::engine::ScoringEngine;
use crate::pipeline::aggregate::ScoredRecord;
use crate::pipeline::metrics::StageTimer;
use crate::pipeline::stats::BatchSummary;
use crate::pipeline::trend::{trend_report, TrendReport};

pub use store::{
    InMemoryProfileStore, InMemoryResultRepository, ProfileStore, ResultRepository, StoredBatch,
};

/// Which stored records to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub suspicious_only: bool,
}

/// Outcome of [`TenantScoringService::process_batch`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub tenant: String,
    pub total_records: usize,
    pub suspicious_count: usize,
    pub processing_time_ms: f64,
    pub summary: BatchSummary,
}

pub struct TenantScoringService<P: ProfileStore, R: ResultRepository> {
    engine: ScoringEngine,
    profiles: P,
    results: R,
}

impl TenantScoringService<InMemoryProfileStore, InMemoryResultRepository> {
    pub fn in_memory(engine: ScoringEngine) -> Self {
        Self::new(
            engine,
            InMemoryProfileStore::new(),
            InMemoryResultRepository::new(),
        )
    }
}

impl<P: ProfileStore, R: ResultRepository> TenantScoringService<P, R> {
    pub fn new(engine: ScoringEngine, profiles: P, results: R) -> Self {
        Self {
            engine,
            profiles,
            results,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Stored profile, or the default (medium sensitivity).
    pub fn risk_appetite(&self, tenant: &str) -> Result<RiskAppetiteProfile> {
        Ok(self.profiles.get(tenant)?.unwrap_or_default())
    }

    /// Validate and replace the tenant's profile. An invalid profile leaves
    /// the stored one untouched.
    pub fn update_risk_appetite(&self, tenant: &str, profile: RiskAppetiteProfile) -> Result<()> {
        if let Err(e) = profile.validate() {
            warn!(
                target: "audit",
                tenant,
                action = "update_risk_appetite",
                code = e.code(),
                error = %e,
                "risk appetite update rejected"
            );
            return Err(e);
        }

        let previous = self.risk_appetite(tenant)?;
        let changes = previous.changed_fields(&profile);
        self.profiles.put(tenant, profile)?;

        for (field, old, new) in &changes {
            info!(
                target: "audit",
                tenant,
                action = "update_risk_appetite",
                field = *field,
                old = %old,
                new = %new,
                "risk appetite field changed"
            );
        }
        info!(
            target: "audit",
            tenant,
            action = "update_risk_appetite",
            changed = changes.len(),
            "risk appetite updated"
        );
        Ok(())
    }

    /// Score a batch under the tenant's profile and store it, replacing the
    /// previous batch.
    pub fn process_batch(&self, tenant: &str, records: &[DuplicateRecord]) -> Result<BatchReport> {
        let timer = StageTimer::start();
        let profile = self.risk_appetite(tenant)?;

        let result = match self.engine.score_default_seed(records, &profile) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    target: "audit",
                    tenant,
                    action = "process_batch",
                    records = records.len(),
                    code = e.code(),
                    error = %e,
                    "batch rejected"
                );
                return Err(e);
            }
        };

        let batch_id = Uuid::new_v4();
        let summary = result.summary;
        self.results.save(
            tenant,
            StoredBatch {
                batch_id,
                processed_at: Utc::now(),
                records: result.records,
                summary: summary.clone(),
            },
        )?;

        let processing_time_ms = timer.finish();
        info!(
            target: "audit",
            tenant,
            action = "process_batch",
            %batch_id,
            records = summary.total_records,
            suspicious = summary.suspicious_count,
            degraded = summary.degraded,
            elapsed_ms = processing_time_ms,
            "batch processed"
        );

        Ok(BatchReport {
            batch_id,
            tenant: tenant.to_string(),
            total_records: summary.total_records,
            suspicious_count: summary.suspicious_count,
            processing_time_ms,
            summary,
        })
    }

    /// Records of the last stored batch. Empty when none was processed.
    pub fn scored_records(&self, tenant: &str, filter: RecordFilter) -> Result<Vec<ScoredRecord>> {
        let records = self
            .results
            .latest(tenant)?
            .map(|b| b.records)
            .unwrap_or_default();
        Ok(records
            .into_iter()
            .filter(|r| !filter.suspicious_only || r.is_suspicious)
            .collect())
    }

    /// Summary of the last stored batch, all-zero when none.
    pub fn summary(&self, tenant: &str) -> Result<BatchSummary> {
        Ok(self
            .results
            .latest(tenant)?
            .map(|b| b.summary)
            .unwrap_or_default())
    }

    pub fn trends(&self, tenant: &str) -> Result<TrendReport> {
        let records = self.scored_records(tenant, RecordFilter::default())?;
        Ok(trend_report(&records))
    }
}
