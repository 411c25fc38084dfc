//! `luna_track` - Menstrual cycle and symptom journal for the terminal
//!
//! Day-keyed entries (flow, symptoms, notes and PCOS/PCOD metrics) held in
//! memory for one session, with a ratatui front end.

#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod insights;
pub mod logging;
pub mod model;
pub mod tracker;
pub mod ui;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Condition, DayRecord, Flow, MetricField, Metrics, Severity};
pub use tracker::{CycleData, Tracker};
