use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const DEFAULT_PERIOD_LENGTH: u32 = 6;

/// Validated cycle assumptions for a single user.
///
/// Only constructed through [`UserCycleProfile::new`], so the lengths are
/// always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCycleProfile {
    average_cycle_length: u32,
    average_period_length: u32,
    anchor_date: Option<NaiveDate>,
}

impl UserCycleProfile {
    /// Both lengths must be at least one day.
    pub fn new(
        average_cycle_length: u32,
        average_period_length: u32,
        anchor_date: Option<NaiveDate>,
    ) -> Result<Self, PredictionError> {
        if average_cycle_length == 0 {
            return Err(PredictionError::InvalidLength {
                field: "averageCycleLength",
                reason: "must be at least 1 day".into(),
            });
        }
        if average_period_length == 0 {
            return Err(PredictionError::InvalidLength {
                field: "averagePeriodLength",
                reason: "must be at least 1 day".into(),
            });
        }
        Ok(Self {
            average_cycle_length,
            average_period_length,
            anchor_date,
        })
    }

    pub fn average_cycle_length(&self) -> u32 {
        self.average_cycle_length
    }

    pub fn average_period_length(&self) -> u32 {
        self.average_period_length
    }

    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.anchor_date
    }
}

impl Default for UserCycleProfile {
    fn default() -> Self {
        Self {
            average_cycle_length: DEFAULT_CYCLE_LENGTH,
            average_period_length: DEFAULT_PERIOD_LENGTH,
            anchor_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub cycle_day: u32,
    pub current_phase: CyclePhase,
    pub days_until_next_period: u32,
    pub next_period_date: NaiveDate,
    pub is_late: bool,
    pub days_late: u32,
}

/// Declaration order doubles as the tie-break for same-day events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Period,
    Fertile,
    Ovulation,
    Pms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regularity {
    Regular,
    Irregular,
}

/// Summary of a user's recorded history. Lengths are in days; the spread is
/// the population standard deviation of cycle lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStats {
    pub recorded_cycles: usize,
    pub average_cycle_length: Option<f64>,
    pub cycle_length_spread: Option<f64>,
    pub average_period_length: Option<f64>,
    pub shortest_cycle_length: Option<i64>,
    pub longest_cycle_length: Option<i64>,
    pub latest_period_start: Option<NaiveDate>,
    pub latest_period_end: Option<NaiveDate>,
}

/// Everything the dashboard renders for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub metrics: CycleMetrics,
    pub regularity: Regularity,
    pub upcoming: Vec<UpcomingEvent>,
    pub stats: CycleStats,
}
