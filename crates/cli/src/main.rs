mod cli;
mod commands;
mod files;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use chores_core::config::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks.
    load_dotenv();
    let args = CliArgs::parse();
    let config = Config::for_profile(&args.profile);

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config.log_summary();

    match args.command {
        Command::Validate { rule } => {
            let result = commands::validate(&rule)?;
            print_json(&result)?;
            if !result.valid {
                std::process::exit(1);
            }
        }
        Command::Expand { rule, from, to } => {
            for date in commands::expand(&rule, from, to)? {
                println!("{}", date);
            }
        }
        Command::Plan {
            definition,
            today,
            horizon_days,
        } => {
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let horizon = horizon_days.unwrap_or(config.schedule.horizon_days);
            let plan = commands::plan(&definition, today, horizon)?;
            print_json(&plan)?;
        }
    }

    Ok(())
}
