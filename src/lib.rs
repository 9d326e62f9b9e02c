//! Cycle day, phase, regularity and upcoming-event prediction.
//!
//! Everything here is a pure function of the supplied profile, cycle history
//! and evaluation time. Loading and storing that data is the caller's job.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod prediction;

pub use commands::{dashboard, dashboard_json, CommandError, LengthInput, ProfileInput};
pub use config::{ConfigError, PredictorConfig};
pub use error::PredictionError;
pub use models::*;
pub use prediction::{
    classify_regularity, compute_cycle_metrics, cycle_stats, project_upcoming_events,
};
