mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;

use fraudscore_core::config::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    match args.command {
        Command::Score(score_args) => {
            let config = Config::from_env();
            config.validate().context("invalid configuration")?;
            config.log_summary();

            let output = commands::score(&score_args, config)?;
            let json = if score_args.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }
            .context("failed to serialize output")?;
            println!("{}", json);
        }
        Command::Rules(rules_args) => {
            print!("{}", commands::rules_yaml(&rules_args)?);
        }
    }
    Ok(())
}
