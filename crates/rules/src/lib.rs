//! Fraud rule engine for duplicate receivables.
//!
//! This crate provides:
//! - A versioned YAML rule set schema compiled into a [`RuleSpec`]
//! - Filesystem loading with a built-in default table
//! - The deterministic evaluator producing [`RuleFinding`]s per record

pub mod evaluator;
pub mod loader;
pub mod schema;

pub use evaluator::{RuleEvaluation, RuleEvaluator, RuleFinding};
pub use loader::{load_or_default, load_rule_set, parse_rule_set, RuleError};
pub use schema::{RuleDefinition, RuleId, RuleSetDocument, RuleSpec, Severity};
