//! Storage seams for the tenant service, with in-memory implementations.
//!
//! Both in-memory stores use `std::sync::RwLock`; locks are held only for
//! the clone or replace, never while scoring.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use fraudscore_core::{Result, RiskAppetiteProfile, ScoringError};

use crate::pipeline::aggregate::ScoredRecord;
use crate::pipeline::stats::BatchSummary;

/// Per-tenant risk appetite storage.
pub trait ProfileStore: Send + Sync {
    fn get(&self, tenant: &str) -> Result<Option<RiskAppetiteProfile>>;

    /// Replace the tenant's profile.
    fn put(&self, tenant: &str, profile: RiskAppetiteProfile) -> Result<()>;
}

/// A scored batch as persisted for a tenant.
#[derive(Debug, Clone, Serialize)]
pub struct StoredBatch {
    pub batch_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub records: Vec<ScoredRecord>,
    pub summary: BatchSummary,
}

/// Scored results storage. Saving replaces the tenant's previous batch.
pub trait ResultRepository: Send + Sync {
    fn save(&self, tenant: &str, batch: StoredBatch) -> Result<()>;

    fn latest(&self, tenant: &str) -> Result<Option<StoredBatch>>;
}

fn poisoned(what: &str) -> ScoringError {
    ScoringError::Other(format!("{} lock poisoned", what))
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, RiskAppetiteProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get(&self, tenant: &str) -> Result<Option<RiskAppetiteProfile>> {
        let guard = self.profiles.read().map_err(|_| poisoned("profile store"))?;
        Ok(guard.get(tenant).cloned())
    }

    fn put(&self, tenant: &str, profile: RiskAppetiteProfile) -> Result<()> {
        let mut guard = self.profiles.write().map_err(|_| poisoned("profile store"))?;
        guard.insert(tenant.to_string(), profile);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryResultRepository {
    batches: Arc<RwLock<HashMap<String, StoredBatch>>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultRepository for InMemoryResultRepository {
    fn save(&self, tenant: &str, batch: StoredBatch) -> Result<()> {
        let mut guard = self.batches.write().map_err(|_| poisoned("result repository"))?;
        guard.insert(tenant.to_string(), batch);
        Ok(())
    }

    fn latest(&self, tenant: &str) -> Result<Option<StoredBatch>> {
        let guard = self.batches.read().map_err(|_| poisoned("result repository"))?;
        Ok(guard.get(tenant).cloned())
    }
}
