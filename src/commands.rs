use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PredictorConfig;
use crate::error::PredictionError;
use crate::models::{CycleRecord, DashboardSummary, UserCycleProfile};
use crate::prediction;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("malformed input: {0}")]
    Json(#[from] serde_json::Error),
}

/// A length as clients send it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LengthInput {
    Number(f64),
    Text(String),
}

/// Profile and history exactly as they arrive from the data layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    pub average_cycle_length: Option<LengthInput>,
    #[serde(default)]
    pub average_period_length: Option<LengthInput>,
    #[serde(default)]
    pub last_period_date: Option<NaiveDate>,
    #[serde(default)]
    pub cycles: Vec<CycleRecord>,
}

impl ProfileInput {
    /// Apply config defaults and validation, and pick the anchor date: the
    /// newest recorded period wins over the declared last period date.
    pub fn into_profile(
        mut self,
        config: &PredictorConfig,
    ) -> Result<(UserCycleProfile, Vec<CycleRecord>), CommandError> {
        let cycle_len = resolve_length(
            "averageCycleLength",
            self.average_cycle_length.as_ref(),
            config.default_cycle_length,
        )?;
        let period_len = resolve_length(
            "averagePeriodLength",
            self.average_period_length.as_ref(),
            config.default_period_length,
        )?;

        self.cycles.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        let anchor = self
            .cycles
            .first()
            .map(|c| c.start_date)
            .or(self.last_period_date);

        let profile = UserCycleProfile::new(cycle_len, period_len, anchor)?;
        debug!(cycle_len, period_len, ?anchor, records = self.cycles.len(), "resolved profile");
        Ok((profile, self.cycles))
    }
}

fn resolve_length(
    field: &'static str,
    input: Option<&LengthInput>,
    default: u32,
) -> Result<u32, PredictionError> {
    let invalid = |reason: &str| PredictionError::InvalidLength {
        field,
        reason: reason.to_string(),
    };

    let value = match input {
        None => return Ok(default),
        Some(LengthInput::Text(text)) if text.trim().is_empty() => return Ok(default),
        Some(LengthInput::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("not a number"))?,
        Some(LengthInput::Number(n)) => *n,
    };

    if !value.is_finite() {
        return Err(invalid("must be finite"));
    }
    if value <= 0.0 {
        return Err(invalid("must be positive"));
    }
    if value.fract() != 0.0 {
        return Err(invalid("must be a whole number of days"));
    }
    if value > f64::from(u32::MAX) {
        return Err(invalid("too large"));
    }
    Ok(value as u32)
}

/// Compute everything the dashboard shows for one user as of `now`.
pub fn dashboard(
    input: ProfileInput,
    config: &PredictorConfig,
    now: NaiveDateTime,
) -> Result<DashboardSummary, CommandError> {
    let (profile, cycles) = input.into_profile(config)?;

    let metrics = prediction::compute_cycle_metrics(&profile, now)?;
    let regularity = prediction::classify_regularity(&cycles);
    let upcoming =
        prediction::project_upcoming_events(&profile, &cycles, now, config.horizon_cycles);
    let stats = prediction::cycle_stats(&cycles);

    info!(
        cycle_day = metrics.cycle_day,
        phase = ?metrics.current_phase,
        ?regularity,
        upcoming = upcoming.len(),
        "dashboard computed"
    );

    Ok(DashboardSummary {
        metrics,
        regularity,
        upcoming,
        stats,
    })
}

/// JSON in, JSON out wrapper around [`dashboard`].
pub fn dashboard_json(
    input: &str,
    config: &PredictorConfig,
    now: NaiveDateTime,
) -> Result<String, CommandError> {
    let input: ProfileInput = serde_json::from_str(input)?;
    let summary = dashboard(input, config, now)?;
    Ok(serde_json::to_string(&summary)?)
}
