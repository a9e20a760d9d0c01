//! YAML schema for versioned fraud rule sets.
//!
//! A rule set document carries the usual header (apiVersion, kind, metadata)
//! and a `spec` listing rule ids with their weights. [`RuleSetDocument::compile`]
//! validates the document and produces the [`RuleSpec`] the evaluator runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use fraudscore_core::{Result, ScoringError};

/// Expected `kind` value of a rule set document.
pub const RULE_SET_KIND: &str = "FraudRuleSet";

// ── Rule ids ────────────────────────────────────────────────────────

/// The fixed rule table. Declaration order is the reporting order for
/// findings and explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    MissingFiscalDocument,
    ExtremeValue,
    InadequateTerm,
    WeekendIssuance,
    RoundValue,
}

impl RuleId {
    pub const ALL: [RuleId; 5] = [
        RuleId::MissingFiscalDocument,
        RuleId::ExtremeValue,
        RuleId::InadequateTerm,
        RuleId::WeekendIssuance,
        RuleId::RoundValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MissingFiscalDocument => "missing_fiscal_document",
            RuleId::ExtremeValue => "extreme_value",
            RuleId::InadequateTerm => "inadequate_term",
            RuleId::WeekendIssuance => "weekend_issuance",
            RuleId::RoundValue => "round_value",
        }
    }

    /// Position in the fixed reporting order.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            RuleId::MissingFiscalDocument => 0.8,
            RuleId::ExtremeValue => 0.6,
            RuleId::InadequateTerm => 0.7,
            RuleId::WeekendIssuance => 0.3,
            RuleId::RoundValue => 0.4,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            RuleId::MissingFiscalDocument => Severity::High,
            RuleId::ExtremeValue => Severity::Medium,
            RuleId::InadequateTerm => Severity::High,
            RuleId::WeekendIssuance => Severity::Low,
            RuleId::RoundValue => Severity::Medium,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RuleId::MissingFiscalDocument => "Receivable has no linked fiscal document",
            RuleId::ExtremeValue => "Value outside the configured low/high bounds",
            RuleId::InadequateTerm => "Term between issue and due date too short or too long",
            RuleId::WeekendIssuance => "Issued on a Saturday or Sunday",
            RuleId::RoundValue => "Exact multiple of 1,000 at or above the round-value floor",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        RuleId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ScoringError::config(format!("unknown rule id: '{}'", s)))
    }
}

/// Reporting severity attached to each rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level rule set document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: RuleSetMetadata,
    pub spec: RuleSetSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetMetadata {
    pub id: String,
    pub name: String,
    /// Version label of the rule table, reported alongside every batch.
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetSpec {
    pub rules: Vec<RuleDefinition>,
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub id: RuleId,
    pub weight: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_true() -> bool {
    true
}

impl RuleDefinition {
    pub fn severity(&self) -> Severity {
        self.severity.unwrap_or_else(|| self.id.default_severity())
    }
}

// ── Compiled (hot-path) types ───────────────────────────────────────

/// Validated rule table, sorted by rule id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSpec {
    pub version: String,
    rules: Vec<RuleDefinition>,
}

impl Default for RuleSpec {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            rules: RuleId::ALL
                .iter()
                .map(|&id| RuleDefinition {
                    id,
                    weight: id.default_weight(),
                    enabled: true,
                    severity: None,
                })
                .collect(),
        }
    }
}

impl RuleSpec {
    /// Build a spec from explicit definitions. Fails on out-of-range
    /// weights, duplicate ids or an empty version label.
    pub fn new(version: impl Into<String>, mut rules: Vec<RuleDefinition>) -> Result<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(ScoringError::config("rule set version must not be empty"));
        }
        rules.sort_by_key(|r| r.id);
        for pair in rules.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ScoringError::config(format!(
                    "rule '{}' defined more than once",
                    pair[0].id
                )));
            }
        }
        for rule in &rules {
            if !rule.weight.is_finite() || !(0.0..=1.0).contains(&rule.weight) {
                return Err(ScoringError::config(format!(
                    "weight of rule '{}' must lie in [0, 1], got {}",
                    rule.id, rule.weight
                )));
            }
        }
        Ok(Self { version, rules })
    }

    /// Default table with one weight replaced.
    pub fn with_weight(mut self, id: RuleId, weight: f64) -> Result<Self> {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => rule.weight = weight,
            None => self.rules.push(RuleDefinition {
                id,
                weight,
                enabled: true,
                severity: None,
            }),
        }
        Self::new(self.version, self.rules)
    }

    /// Enabled rules in rule-id order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    pub fn get(&self, id: RuleId) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Wrap this spec in a document, e.g. for printing as YAML.
    pub fn to_document(&self) -> RuleSetDocument {
        RuleSetDocument {
            api_version: "v1".to_string(),
            kind: RULE_SET_KIND.to_string(),
            metadata: RuleSetMetadata {
                id: "duplicate-fraud-rules".to_string(),
                name: "Duplicate receivable fraud rules".to_string(),
                version: self.version.clone(),
                description: None,
            },
            spec: RuleSetSpec {
                rules: self.rules.clone(),
            },
        }
    }
}

impl RuleSetDocument {
    /// Validate and compile into the evaluator's form.
    pub fn compile(&self) -> Result<RuleSpec> {
        if self.kind != RULE_SET_KIND {
            return Err(ScoringError::config(format!(
                "expected kind '{}', got '{}'",
                RULE_SET_KIND, self.kind
            )));
        }
        RuleSpec::new(self.metadata.version.clone(), self.spec.rules.clone())
    }
}
