//! CLI interface for emistat
//!
//! This module defines the command-line interface using clap.
//!
//! # Example
//!
//! ```bash
//! # Aggregate a batch of activities into grouped totals
//! emistat report activities.jsonl --since 2025-01-01 --until 2025-01-31
//!
//! # Itemized per-activity results as JSON
//! emistat items activities.jsonl --json
//!
//! # One-shot calculation
//! emistat calculate --activity-type Impressions --channel "Google Ads" \
//!     --market US --quantity 10000 --unit impression --date 2025-01-15
//!
//! # Inspect the loaded factor dataset
//! emistat factors --category purchased-electricity
//! ```

use crate::error::{EmistatError, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Calculate and report GHG Protocol carbon emissions for activity data
#[derive(Parser, Debug, Clone)]
#[command(name = "emistat")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Show debug output (default is warnings and errors only)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use the embedded factor dataset without fetching updates
    #[arg(long, global = true)]
    pub offline: bool,

    /// Load the factor dataset from a file
    #[arg(long, global = true, env = "EMISTAT_FACTORS_PATH")]
    pub factors_file: Option<PathBuf>,

    /// Filter by start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Filter by end date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Filter by market
    #[arg(long, short = 'm', global = true)]
    pub market: Option<String>,

    /// Filter by channel
    #[arg(long, short = 'c', global = true)]
    pub channel: Option<String>,

    /// Filter by campaign tag
    #[arg(long, global = true)]
    pub campaign: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Aggregate activity records into grouped emission totals
    Report {
        /// Activity JSONL file or directory of files
        input: PathBuf,
    },

    /// Show itemized per-activity emission results
    Items {
        /// Activity JSONL file or directory of files
        input: PathBuf,
    },

    /// Calculate emissions for a single activity
    Calculate {
        /// Kind of activity, e.g. "Impressions", "CloudComputeHours"
        #[arg(long)]
        activity_type: String,

        /// Channel grouping, e.g. "Google Ads", "AWS"
        #[arg(long)]
        channel: String,

        /// Geographic market/country code
        #[arg(long)]
        market: String,

        /// Amount of activity in the given unit
        #[arg(long)]
        quantity: f64,

        /// Unit key, e.g. "impression", "gb", "km", "kwh"
        #[arg(long)]
        unit: String,

        /// GHG scope hint (1, 2 or 3); the classifier's scope wins on mismatch
        #[arg(long)]
        scope: Option<u8>,

        /// Activity date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Campaign tag, passed through to the result
        #[arg(long)]
        campaign: Option<String>,
    },

    /// List the emission factors in the loaded dataset
    Factors {
        /// Only show factors for one category
        #[arg(long)]
        category: Option<String>,
    },
}

/// Parse a date filter that may be a full date or a month.
///
/// `YYYY-MM-DD` parses as-is; `YYYY-MM` parses as the first day of the
/// month, which is the natural reading for a `--since` bound.
pub fn parse_date_filter(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(date);
    }

    Err(EmistatError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date_filter_full_date() {
        let date = parse_date_filter("2025-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_filter_month() {
        let date = parse_date_filter("2025-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_date_filter_invalid() {
        let err = parse_date_filter("January 2025").unwrap_err();
        assert!(matches!(err, EmistatError::InvalidDate(_)));
    }

    #[test]
    fn test_calculate_args() {
        let cli = Cli::parse_from([
            "emistat",
            "calculate",
            "--activity-type",
            "Impressions",
            "--channel",
            "Google Ads",
            "--market",
            "US",
            "--quantity",
            "10000",
            "--unit",
            "impression",
            "--scope",
            "3",
            "--date",
            "2025-01-15",
        ]);

        match cli.command {
            Command::Calculate {
                activity_type,
                quantity,
                scope,
                ..
            } => {
                assert_eq!(activity_type, "Impressions");
                assert_eq!(quantity, 10000.0);
                assert_eq!(scope, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
