use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fraud risk scoring for duplicate receivables.
///
/// Scores a batch of records with the deterministic rule set and the
/// batch-fitted anomaly model, and prints verdicts plus a summary as JSON.
#[derive(Parser, Debug)]
#[command(name = "fraudscore", about = "Fraud risk scoring for duplicate receivables")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a JSON array of records
    Score(ScoreArgs),
    /// Print the active rule set as YAML
    Rules(RulesArgs),
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// JSON file holding an array of records
    pub input: PathBuf,

    /// Risk appetite profile (JSON); defaults to medium sensitivity
    #[arg(long, env = "FRAUDSCORE_PROFILE_FILE")]
    pub profile: Option<PathBuf>,

    /// Rule set file (YAML); defaults to the built-in table
    #[arg(long, env = "FRAUDSCORE_RULES")]
    pub rules: Option<PathBuf>,

    /// Anomaly model seed (overrides FRAUD_ML_SEED)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only print suspicious records
    #[arg(long)]
    pub suspicious_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Rule set file (YAML); defaults to the built-in table
    #[arg(long, env = "FRAUDSCORE_RULES")]
    pub rules: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_score_command() {
        let args = CliArgs::parse_from([
            "fraudscore",
            "score",
            "batch.json",
            "--seed",
            "7",
            "--suspicious-only",
        ]);
        match args.command {
            Command::Score(s) => {
                assert_eq!(s.input, PathBuf::from("batch.json"));
                assert_eq!(s.seed, Some(7));
                assert!(s.suspicious_only);
                assert!(!s.pretty);
            }
            Command::Rules(_) => panic!("expected score command"),
        }
    }

    #[test]
    fn parse_rules_command() {
        let args = CliArgs::parse_from(["fraudscore", "rules", "--rules", "custom.yml"]);
        assert!(matches!(
            args.command,
            Command::Rules(RulesArgs { rules: Some(_) })
        ));
    }
}
