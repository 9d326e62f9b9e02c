use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::error::PredictionError;
use crate::models::{
    CycleMetrics, CyclePhase, CycleRecord, CycleStats, EventType, Regularity, UpcomingEvent,
    UserCycleProfile,
};

/// Standard deviation of cycle gaps (days) above which history counts as irregular.
pub const IRREGULARITY_THRESHOLD_DAYS: f64 = 7.0;
/// Minimum number of records before regularity is judged at all.
pub const MIN_RECORDS_FOR_REGULARITY: usize = 3;
pub const MAX_UPCOMING_EVENTS: usize = 5;

// Fixed offsets from the cycle start, independent of cycle length.
const FERTILE_WINDOW_START_OFFSET: i64 = 10;
const OVULATION_OFFSET: i64 = 14;
const FERTILE_WINDOW_END_OFFSET: i64 = 17;
const PMS_LEAD_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

/// Current cycle day, phase and next-period countdown as of `now`.
///
/// Without an anchor date there is nothing to project from, so a neutral
/// day-one result is returned with the phase left `Unknown`.
pub fn compute_cycle_metrics(
    profile: &UserCycleProfile,
    now: NaiveDateTime,
) -> Result<CycleMetrics, PredictionError> {
    let cycle_len = i64::from(profile.average_cycle_length());
    let period_len = i64::from(profile.average_period_length());

    let Some(anchor) = profile.anchor_date() else {
        debug!("no anchor date, returning neutral metrics");
        let next_period_date =
            shift(now.date(), cycle_len).ok_or(PredictionError::DateOutOfRange)?;
        return Ok(CycleMetrics {
            cycle_day: 1,
            current_phase: CyclePhase::Unknown,
            days_until_next_period: profile.average_cycle_length(),
            next_period_date,
            is_late: false,
            days_late: 0,
        });
    };

    let elapsed = (now - at_midnight(anchor)).num_seconds();
    let raw_day = elapsed.div_euclid(SECONDS_PER_DAY) + 1;
    if raw_day < 1 {
        debug!(%anchor, %now, "anchor date lies after now, clamping cycle day");
    }
    let cycle_day = raw_day.max(1);

    let next_period_date = shift(anchor, cycle_len).ok_or(PredictionError::DateOutOfRange)?;
    let remaining = (at_midnight(next_period_date) - now).num_seconds();
    let days_until = ceil_days(remaining);

    let current_phase = classify_phase(cycle_day, cycle_len, period_len);
    debug!(cycle_day, ?current_phase, days_until, "computed cycle metrics");

    Ok(CycleMetrics {
        cycle_day: saturate(cycle_day),
        current_phase,
        days_until_next_period: saturate(days_until.max(0)),
        next_period_date,
        is_late: days_until < 0,
        days_late: saturate((-days_until).max(0)),
    })
}

/// Bands are checked in priority order; menstrual wins where bands overlap.
/// Ovulation is the five days from `cycle_len - 14` to `cycle_len - 10`.
fn classify_phase(cycle_day: i64, cycle_len: i64, period_len: i64) -> CyclePhase {
    if cycle_day <= period_len {
        CyclePhase::Menstrual
    } else if (cycle_len - 14..=cycle_len - 10).contains(&cycle_day) {
        CyclePhase::Ovulation
    } else if cycle_day > cycle_len - 10 {
        CyclePhase::Luteal
    } else {
        CyclePhase::Follicular
    }
}

/// Classify cycle history by the spread of gaps between period starts.
/// Records must be sorted newest first.
pub fn classify_regularity(records: &[CycleRecord]) -> Regularity {
    if records.len() < MIN_RECORDS_FOR_REGULARITY {
        return Regularity::Regular;
    }

    let gaps = cycle_gaps(records);
    let discarded = records.len() - 1 - gaps.len();
    if discarded > 0 {
        warn!(discarded, "discarding non-positive cycle gaps");
    }

    let gap_days: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();
    let std_dev = population_std_deviation(&gap_days);
    debug!(gaps = gaps.len(), std_dev, "classified cycle regularity");

    if std_dev > IRREGULARITY_THRESHOLD_DAYS {
        Regularity::Irregular
    } else {
        Regularity::Regular
    }
}

/// Predicted period, fertile-window, ovulation and PMS dates over the next
/// `horizon_cycles` cycles, soonest first, capped at [`MAX_UPCOMING_EVENTS`].
///
/// The newest record's start date is the baseline, falling back to the
/// profile's anchor date. Same-day events are ordered by [`EventType`].
/// Scanning stops once later cycles can no longer displace a kept event, or
/// when dates run past the end of the calendar.
pub fn project_upcoming_events(
    profile: &UserCycleProfile,
    records: &[CycleRecord],
    now: NaiveDateTime,
    horizon_cycles: u32,
) -> Vec<UpcomingEvent> {
    let Some(baseline) = records
        .first()
        .map(|r| r.start_date)
        .or(profile.anchor_date())
    else {
        debug!("no baseline date, nothing to project");
        return Vec::new();
    };

    let cycle_len = i64::from(profile.average_cycle_length());
    let period_len = i64::from(profile.average_period_length());
    // No candidate lands earlier than this many days after its cycle start.
    let earliest_offset = FERTILE_WINDOW_START_OFFSET.min(cycle_len - PMS_LEAD_DAYS);

    let mut events: Vec<UpcomingEvent> = Vec::with_capacity(MAX_UPCOMING_EVENTS * 2);
    let mut cycle_start = Some(baseline);
    for _ in 0..horizon_cycles {
        let Some(base) = cycle_start else {
            debug!(%baseline, "projection reached the end of the calendar");
            break;
        };

        events.extend(
            cycle_candidates(base, cycle_len, period_len)
                .into_iter()
                .filter(|e| at_midnight(e.date) > now),
        );
        events.sort_by_key(|e| (e.date, e.event_type));
        events.truncate(MAX_UPCOMING_EVENTS);

        cycle_start = shift(base, cycle_len);
        if let (Some(last), Some(next)) = (events.get(MAX_UPCOMING_EVENTS - 1), cycle_start) {
            if shift(next, earliest_offset).map_or(true, |earliest| earliest > last.date) {
                break;
            }
        }
    }

    debug!(%baseline, count = events.len(), "projected upcoming events");
    events
}

/// Candidate events for the cycle starting on `base`. Dates beyond the
/// calendar are left out.
fn cycle_candidates(base: NaiveDate, cycle_len: i64, period_len: i64) -> Vec<UpcomingEvent> {
    let period_start = shift(base, cycle_len);
    let candidates = [
        (
            period_start,
            EventType::Period,
            "Predicted period start",
            "Your next period is expected to begin",
        ),
        (
            period_start.and_then(|d| shift(d, period_len)),
            EventType::Period,
            "Predicted period end",
            "Your period is expected to end",
        ),
        (
            shift(base, FERTILE_WINDOW_START_OFFSET),
            EventType::Fertile,
            "Fertile window opens",
            "Chance of conception is higher from today",
        ),
        (
            shift(base, OVULATION_OFFSET),
            EventType::Ovulation,
            "Predicted ovulation",
            "Estimated ovulation day",
        ),
        (
            shift(base, FERTILE_WINDOW_END_OFFSET),
            EventType::Fertile,
            "Fertile window closes",
            "Last day of the estimated fertile window",
        ),
        (
            shift(base, cycle_len - PMS_LEAD_DAYS),
            EventType::Pms,
            "PMS window",
            "Premenstrual symptoms may start around now",
        ),
    ];

    candidates
        .into_iter()
        .filter_map(|(date, event_type, title, description)| {
            Some(UpcomingEvent {
                title: title.to_string(),
                date: date?,
                event_type,
                description: description.to_string(),
            })
        })
        .collect()
}

/// Summary of the recorded history for the analysis view.
/// Records must be sorted newest first; only closed periods count toward
/// the average period length.
pub fn cycle_stats(records: &[CycleRecord]) -> CycleStats {
    let gaps = cycle_gaps(records);
    let gap_days: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();

    let period_days: Vec<f64> = records
        .iter()
        .filter_map(|r| r.end_date.map(|end| (end - r.start_date).num_days() + 1))
        .filter(|&days| days > 0)
        .map(|days| days as f64)
        .collect();

    let latest = records.first();
    CycleStats {
        recorded_cycles: records.len(),
        average_cycle_length: (!gap_days.is_empty()).then(|| mean(&gap_days)),
        cycle_length_spread: (!gap_days.is_empty()).then(|| population_std_deviation(&gap_days)),
        average_period_length: (!period_days.is_empty()).then(|| mean(&period_days)),
        shortest_cycle_length: gaps.iter().copied().min(),
        longest_cycle_length: gaps.iter().copied().max(),
        latest_period_start: latest.map(|r| r.start_date),
        latest_period_end: latest.and_then(|r| r.end_date),
    }
}

/// Days between consecutive period starts of a newest-first history.
/// Non-positive gaps are data errors and are skipped.
fn cycle_gaps(records: &[CycleRecord]) -> Vec<i64> {
    records
        .windows(2)
        .map(|w| (w[0].start_date - w[1].start_date).num_days())
        .filter(|&gap| gap > 0)
        .collect()
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    chrono::Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

fn at_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn ceil_days(seconds: i64) -> i64 {
    -(-seconds).div_euclid(SECONDS_PER_DAY)
}

fn saturate(days: i64) -> u32 {
    u32::try_from(days).unwrap_or(u32::MAX)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
