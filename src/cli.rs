//! Command-line interface for the `luna-track` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::logging::Verbosity;
use crate::model::{Condition, parse_date_key};

/// luna-track - Log your cycle from the terminal
///
/// Flow, symptoms, notes and PCOS/PCOD metrics per day. Everything stays in
/// memory and is gone when you quit.
#[derive(Debug, Parser)]
#[command(name = "luna-track")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Date to open the editor on (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Skip onboarding with this condition (pcos, pcod, neither)
    #[arg(long, value_name = "CONDITION", value_parser = parse_condition_arg)]
    pub condition: Option<Condition>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date_key(s).map_err(|e| e.to_string())
}

fn parse_condition_arg(s: &str) -> Result<Condition, String> {
    s.parse()
}
