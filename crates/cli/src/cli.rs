use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Household chore scheduler.
///
/// Validates recurrence rules, expands them into dates, and previews the
/// occurrences a chore definition would generate.
#[derive(Parser, Debug)]
#[command(name = "chores", about = "Household chore recurrence and rotation")]
pub struct CliArgs {
    /// Config profile (reads `{PROFILE}_{KEY}` env vars before `{KEY}`)
    #[arg(long, global = true, env = "CHORES_PROFILE", default_value = "")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a recurrence rule file and print the result as JSON
    Validate {
        /// Rule file (.json, .yml or .yaml)
        #[arg(long)]
        rule: PathBuf,
    },

    /// Print every date a rule produces in an inclusive window
    Expand {
        /// Rule file (.json, .yml or .yaml)
        #[arg(long)]
        rule: PathBuf,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Preview the occurrences a definition would generate
    Plan {
        /// Chore definition file (.json, .yml or .yaml)
        #[arg(long)]
        definition: PathBuf,

        /// Generation date (defaults to the current UTC day)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Horizon override (defaults to CHORES_HORIZON_DAYS)
        #[arg(long)]
        horizon_days: Option<u32>,
    },
}
