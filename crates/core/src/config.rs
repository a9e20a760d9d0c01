use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub engine: EngineConfig,
    pub anomaly: AnomalyConfig,
    pub blend: BlendStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            engine: EngineConfig::default(),
            anomaly: AnomalyConfig::default(),
            blend: BlendStrategy::default(),
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `FRAUDSCORE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("FRAUDSCORE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            engine: EngineConfig::from_env_profiled(p),
            anomaly: AnomalyConfig::from_env_profiled(p),
            blend: BlendStrategy::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.anomaly.validate()?;
        self.blend.validate()
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  engine:   max_batch_size={}, seed={}, top_reasons={}",
            self.engine.max_batch_size,
            self.engine.seed,
            self.engine.top_reasons
        );
        tracing::info!(
            "  anomaly:  n_trees={}, sample_size={}, min_samples={}, trigger_cutoff={}",
            self.anomaly.n_trees,
            self.anomaly.sample_size,
            self.anomaly.min_samples,
            self.anomaly.trigger_cutoff
        );
        tracing::info!("  blend:    {:?}", self.blend);
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Batches larger than this are rejected before any work is done.
    pub max_batch_size: usize,
    /// Seed for the anomaly model. Identical inputs and seed reproduce
    /// identical scores.
    pub seed: u64,
    /// Number of reasons listed in the batch summary.
    pub top_reasons: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100_000,
            seed: 42,
            top_reasons: 5,
        }
    }
}

impl EngineConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            max_batch_size: profiled_env_parse(p, "FRAUD_MAX_BATCH_SIZE", d.max_batch_size),
            seed: profiled_env_parse(p, "FRAUD_ML_SEED", d.seed),
            top_reasons: profiled_env_parse(p, "FRAUD_TOP_REASONS", d.top_reasons),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(ScoringError::config("max_batch_size must be at least 1"));
        }
        Ok(())
    }
}

// ── Anomaly model ─────────────────────────────────────────────

/// Isolation forest parameters. The seed is deliberately not part of this
/// struct: it is passed to every fit call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyConfig {
    pub n_trees: usize,
    /// Sub-sample size per tree (capped at the batch size).
    pub sample_size: usize,
    /// Batches with fewer usable rows bypass the model.
    pub min_samples: usize,
    /// Normalized anomaly scores above this add an explanation.
    pub trigger_cutoff: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            sample_size: 256,
            min_samples: 10,
            trigger_cutoff: 0.6,
        }
    }
}

impl AnomalyConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            n_trees: profiled_env_parse(p, "FRAUD_ML_N_TREES", d.n_trees),
            sample_size: profiled_env_parse(p, "FRAUD_ML_SAMPLE_SIZE", d.sample_size),
            min_samples: profiled_env_parse(p, "FRAUD_ML_MIN_SAMPLES", d.min_samples),
            trigger_cutoff: profiled_env_parse(p, "FRAUD_ML_TRIGGER_CUTOFF", d.trigger_cutoff),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ScoringError::config("n_trees must be at least 1"));
        }
        if self.sample_size < 2 {
            return Err(ScoringError::config("sample_size must be at least 2"));
        }
        if self.min_samples < 2 {
            return Err(ScoringError::config("min_samples must be at least 2"));
        }
        if !self.trigger_cutoff.is_finite() || !(0.0..=1.0).contains(&self.trigger_cutoff) {
            return Err(ScoringError::config(format!(
                "trigger_cutoff must lie in [0, 1], got {}",
                self.trigger_cutoff
            )));
        }
        Ok(())
    }
}

// ── Score blend ───────────────────────────────────────────────

/// How rule and anomaly scores merge into the final risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlendStrategy {
    /// `rule * w_rule + ml * w_ml`, weights normalized to sum to 1.
    WeightedSum { rule: f64, ml: f64 },
    /// Larger of the two scores.
    Max,
}

impl Default for BlendStrategy {
    fn default() -> Self {
        BlendStrategy::WeightedSum { rule: 0.7, ml: 0.3 }
    }
}

impl BlendStrategy {
    fn from_env_profiled(p: &str) -> Self {
        match profiled_env_or(p, "FRAUD_BLEND", "weighted_sum").as_str() {
            "max" => BlendStrategy::Max,
            _ => BlendStrategy::WeightedSum {
                rule: profiled_env_parse(p, "FRAUD_BLEND_RULE_WEIGHT", 0.7),
                ml: profiled_env_parse(p, "FRAUD_BLEND_ML_WEIGHT", 0.3),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let BlendStrategy::WeightedSum { rule, ml } = *self {
            if !rule.is_finite() || !ml.is_finite() || rule < 0.0 || ml < 0.0 {
                return Err(ScoringError::config(format!(
                    "blend weights must be non-negative finite numbers, got rule={} ml={}",
                    rule, ml
                )));
            }
            if rule + ml <= f64::EPSILON {
                return Err(ScoringError::config("blend weights must not both be zero"));
            }
        }
        Ok(())
    }

    /// Combine both signals. When the anomaly model did not run,
    /// the rule score passes through unchanged.
    pub fn combine(&self, rule_score: f64, anomaly_score: f64, ml_active: bool) -> f64 {
        if !ml_active {
            return rule_score.clamp(0.0, 1.0);
        }
        let combined = match *self {
            BlendStrategy::WeightedSum { rule, ml } => {
                let total = rule + ml;
                (rule / total) * rule_score + (ml / total) * anomaly_score
            }
            BlendStrategy::Max => rule_score.max(anomaly_score),
        };
        combined.clamp(0.0, 1.0)
    }
}
