//! `luna-track` - terminal front end for the cycle journal.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;

use luna_track::cli::Cli;
use luna_track::{Config, Tracker, init_logging, ui};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if config.logging.enabled {
        init_logging(cli.verbosity(), &config.log_file()).context("starting log file")?;
    }

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let mut tracker = Tracker::new(date);
    if let Some(condition) = cli.condition.or(config.tracker.condition) {
        tracker.choose_condition(condition);
    }
    info!(%date, onboarded = tracker.is_onboarded(), "starting luna-track");

    ui::run(&config, tracker)
}
