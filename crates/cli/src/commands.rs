use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use fraudscore_compute::{BatchSummary, ScoredRecord, ScoringEngine};
use fraudscore_core::{ingest_batch, Config, RawDuplicateRecord, RiskAppetiteProfile};
use fraudscore_rules::load_or_default;

use crate::cli::{RulesArgs, ScoreArgs};

/// JSON document printed by `fraudscore score`.
#[derive(Debug, Serialize)]
pub struct ScoreOutput {
    pub seed: u64,
    pub profile: RiskAppetiteProfile,
    pub records: Vec<ScoredRecord>,
    pub summary: BatchSummary,
}

fn read_profile(path: Option<&Path>) -> Result<RiskAppetiteProfile> {
    let Some(path) = path else {
        return Ok(RiskAppetiteProfile::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: RiskAppetiteProfile = serde_json::from_str(&text)
        .with_context(|| format!("invalid profile JSON in {}", path.display()))?;
    profile.validate().context("invalid risk appetite profile")?;
    Ok(profile)
}

fn read_records(path: &Path) -> Result<Vec<RawDuplicateRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid records JSON in {}", path.display()))
}

pub fn score(args: &ScoreArgs, config: Config) -> Result<ScoreOutput> {
    let rules = load_or_default(args.rules.as_deref()).context("failed to load rule set")?;
    let profile = read_profile(args.profile.as_deref())?;
    let records = ingest_batch(read_records(&args.input)?).context("rejected input batch")?;

    let seed = args.seed.unwrap_or(config.engine.seed);
    let engine = ScoringEngine::new(config, rules).context("invalid engine configuration")?;
    let result = engine
        .score(&records, &profile, seed)
        .context("scoring failed")?;
    info!(
        input = %args.input.display(),
        records = result.summary.total_records,
        suspicious = result.summary.suspicious_count,
        "scored"
    );

    let records = result
        .records
        .into_iter()
        .filter(|r| !args.suspicious_only || r.is_suspicious)
        .collect();
    Ok(ScoreOutput {
        seed,
        profile,
        records,
        summary: result.summary,
    })
}

pub fn rules_yaml(args: &RulesArgs) -> Result<String> {
    let rules = load_or_default(args.rules.as_deref()).context("failed to load rule set")?;
    serde_yaml::to_string(&rules.to_document()).context("failed to render rule set")
}
