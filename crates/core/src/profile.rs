//! Per-tenant risk appetite.
//!
//! A [`RiskAppetiteProfile`] is a plain value: the engine receives it on every
//! call and never stores it. Every field is spelled out, so nothing is
//! resolved from hidden defaults outside this module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// How aggressively records are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    /// Threshold used when the profile carries no explicit one.
    /// Higher sensitivity means a lower threshold.
    pub fn default_threshold(self) -> f64 {
        match self {
            Sensitivity::Low => 0.7,
            Sensitivity::Medium => 0.5,
            Sensitivity::High => 0.3,
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sensitivity::Low => write!(f, "low"),
            Sensitivity::Medium => write!(f, "medium"),
            Sensitivity::High => write!(f, "high"),
        }
    }
}

impl FromStr for Sensitivity {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(ScoringError::config(format!(
                "unknown sensitivity '{}' (expected low, medium or high)",
                other
            ))),
        }
    }
}

/// Trigger parameters for the value and term rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomThresholds {
    /// Values strictly above this are extreme.
    pub high_value: f64,
    /// Values strictly below this are extreme.
    pub low_value: f64,
    /// Terms strictly shorter than this many days are inadequate.
    pub short_term_days: i64,
    /// Terms strictly longer than this many days are inadequate.
    pub max_term_days: i64,
    /// Smallest value the round-value pattern applies to.
    pub round_value_floor: f64,
}

impl Default for CustomThresholds {
    fn default() -> Self {
        Self {
            high_value: 1_000_000.0,
            low_value: 100.0,
            short_term_days: 7,
            max_term_days: 365,
            round_value_floor: 10_000.0,
        }
    }
}

impl CustomThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("high_value", self.high_value),
            ("low_value", self.low_value),
            ("round_value_floor", self.round_value_floor),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ScoringError::config(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, v
                )));
            }
        }
        if self.high_value <= self.low_value {
            return Err(ScoringError::config(format!(
                "high_value ({}) must be greater than low_value ({})",
                self.high_value, self.low_value
            )));
        }
        if self.short_term_days < 0 {
            return Err(ScoringError::config(format!(
                "short_term_days must not be negative, got {}",
                self.short_term_days
            )));
        }
        if self.max_term_days <= self.short_term_days {
            return Err(ScoringError::config(format!(
                "max_term_days ({}) must be greater than short_term_days ({})",
                self.max_term_days, self.short_term_days
            )));
        }
        Ok(())
    }
}

/// Tenant risk appetite, supplied per engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAppetiteProfile {
    pub sensitivity: Sensitivity,
    /// Explicit cut-off in [0, 1]; overrides the sensitivity default.
    pub threshold: Option<f64>,
    pub enable_ml_detection: bool,
    pub custom_thresholds: CustomThresholds,
}

impl Default for RiskAppetiteProfile {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            threshold: None,
            enable_ml_detection: true,
            custom_thresholds: CustomThresholds::default(),
        }
    }
}

impl RiskAppetiteProfile {
    pub fn with_sensitivity(sensitivity: Sensitivity) -> Self {
        Self {
            sensitivity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.threshold {
            if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                return Err(ScoringError::config(format!(
                    "threshold must lie in [0, 1], got {}",
                    t
                )));
            }
        }
        self.custom_thresholds.validate()
    }

    /// Explicit threshold if present, otherwise the sensitivity default.
    pub fn effective_threshold(&self) -> f64 {
        self.threshold
            .unwrap_or_else(|| self.sensitivity.default_threshold())
    }

    /// Names and old/new values of every field that differs between two
    /// profiles, for audit trails.
    pub fn changed_fields(&self, new: &RiskAppetiteProfile) -> Vec<(&'static str, String, String)> {
        let mut changes = Vec::new();
        if self.sensitivity != new.sensitivity {
            changes.push(("sensitivity", self.sensitivity.to_string(), new.sensitivity.to_string()));
        }
        if self.threshold != new.threshold {
            changes.push(("threshold", format!("{:?}", self.threshold), format!("{:?}", new.threshold)));
        }
        if self.enable_ml_detection != new.enable_ml_detection {
            changes.push((
                "enable_ml_detection",
                self.enable_ml_detection.to_string(),
                new.enable_ml_detection.to_string(),
            ));
        }
        let (a, b) = (&self.custom_thresholds, &new.custom_thresholds);
        if a.high_value != b.high_value {
            changes.push(("high_value", a.high_value.to_string(), b.high_value.to_string()));
        }
        if a.low_value != b.low_value {
            changes.push(("low_value", a.low_value.to_string(), b.low_value.to_string()));
        }
        if a.short_term_days != b.short_term_days {
            changes.push(("short_term_days", a.short_term_days.to_string(), b.short_term_days.to_string()));
        }
        if a.max_term_days != b.max_term_days {
            changes.push(("max_term_days", a.max_term_days.to_string(), b.max_term_days.to_string()));
        }
        if a.round_value_floor != b.round_value_floor {
            changes.push((
                "round_value_floor",
                a.round_value_floor.to_string(),
                b.round_value_floor.to_string(),
            ));
        }
        changes
    }
}
