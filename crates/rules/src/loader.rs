//! Filesystem loader for rule set documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use fraudscore_core::ScoringError;

use crate::schema::{RuleSetDocument, RuleSpec};

/// Errors that can occur while loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<RuleError> for ScoringError {
    fn from(e: RuleError) -> Self {
        ScoringError::Configuration(e.to_string())
    }
}

/// Parse and compile a rule set from YAML text.
pub fn parse_rule_set(yaml: &str) -> Result<RuleSpec, RuleError> {
    let doc: RuleSetDocument = serde_yaml::from_str(yaml)?;
    doc.compile()
        .map_err(|e| RuleError::Validation(e.to_string()))
}

/// Load a rule set from a `.yml` / `.yaml` file.
pub fn load_rule_set(path: &Path) -> Result<RuleSpec, RuleError> {
    let yaml = fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match parse_rule_set(&yaml) {
        Ok(spec) => {
            info!(
                path = %path.display(),
                version = %spec.version,
                rules = spec.rules().len(),
                "rule set loaded"
            );
            Ok(spec)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load rule set");
            Err(e)
        }
    }
}

/// Load from `path` when given, otherwise fall back to the built-in table.
pub fn load_or_default(path: Option<&Path>) -> Result<RuleSpec, RuleError> {
    match path {
        Some(p) => load_rule_set(p),
        None => Ok(RuleSpec::default()),
    }
}
