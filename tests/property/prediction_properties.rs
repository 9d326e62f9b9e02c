use chrono::{Duration, NaiveDate, NaiveDateTime};
use cykel_predict::{
    classify_regularity, compute_cycle_metrics, project_upcoming_events, CyclePhase, CycleRecord,
    Regularity, UpcomingEvent, UserCycleProfile,
};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn at(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap()
}

fn anchor_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|d| base_date() + Duration::days(d))
}

/// Newest-first history and its newest start date.
fn history_strategy() -> impl Strategy<Value = (Vec<CycleRecord>, NaiveDate)> {
    (anchor_strategy(), proptest::collection::vec(1i64..60, 0..8)).prop_map(|(newest, gaps)| {
        let mut start = newest;
        let mut records = vec![CycleRecord { start_date: start, end_date: None }];
        for gap in gaps {
            start -= Duration::days(gap);
            records.push(CycleRecord {
                start_date: start,
                end_date: Some(start + Duration::days(4)),
            });
        }
        (records, newest)
    })
}

fn assert_bounded_future_sorted(
    events: &[UpcomingEvent],
    now: NaiveDateTime,
) -> Result<(), TestCaseError> {
    prop_assert!(events.len() <= 5);
    prop_assert!(events.iter().all(|e| at(e.date) > now));
    prop_assert!(events
        .windows(2)
        .all(|w| (w[0].date, w[0].event_type) <= (w[1].date, w[1].event_type)));
    Ok(())
}

proptest! {
    #[test]
    fn no_anchor_is_day_one_unknown(
        cycle in 1u32..60,
        period in 1u32..15,
        offset in 0i64..100_000,
    ) {
        let profile = UserCycleProfile::new(cycle, period, None).unwrap();
        let now = at(base_date()) + Duration::minutes(offset);
        let m = compute_cycle_metrics(&profile, now).unwrap();
        prop_assert_eq!(m.cycle_day, 1);
        prop_assert_eq!(m.current_phase, CyclePhase::Unknown);
        prop_assert_eq!(m.days_until_next_period, cycle);
        prop_assert!(!m.is_late);
    }

    #[test]
    fn anchor_today_is_menstrual_day_one(
        cycle in 1u32..60,
        period in 1u32..15,
        anchor in anchor_strategy(),
    ) {
        let profile = UserCycleProfile::new(cycle, period, Some(anchor)).unwrap();
        let m = compute_cycle_metrics(&profile, at(anchor)).unwrap();
        prop_assert_eq!(m.cycle_day, 1);
        prop_assert_eq!(m.current_phase, CyclePhase::Menstrual);
    }

    #[test]
    fn lateness_starts_the_day_after_due(
        cycle in 1u32..60,
        period in 1u32..15,
        anchor in anchor_strategy(),
    ) {
        let profile = UserCycleProfile::new(cycle, period, Some(anchor)).unwrap();
        let due = at(anchor) + Duration::days(i64::from(cycle));

        let on_time = compute_cycle_metrics(&profile, due).unwrap();
        prop_assert!(!on_time.is_late);
        prop_assert_eq!(on_time.days_until_next_period, 0);

        let late = compute_cycle_metrics(&profile, due + Duration::days(1)).unwrap();
        prop_assert!(late.is_late);
        prop_assert_eq!(late.days_late, 1);
    }

    #[test]
    fn metrics_are_deterministic(
        cycle in 1u32..60,
        period in 1u32..15,
        anchor in anchor_strategy(),
        minutes in 0i64..200_000,
    ) {
        let profile = UserCycleProfile::new(cycle, period, Some(anchor)).unwrap();
        let now = at(base_date()) + Duration::minutes(minutes);
        prop_assert_eq!(
            compute_cycle_metrics(&profile, now).unwrap(),
            compute_cycle_metrics(&profile, now).unwrap()
        );
    }

    #[test]
    fn short_history_is_regular(gaps in proptest::collection::vec(1i64..200, 0..2)) {
        let mut start = base_date() + Duration::days(2000);
        let mut records = vec![CycleRecord { start_date: start, end_date: None }];
        for gap in gaps {
            start -= Duration::days(gap);
            records.push(CycleRecord { start_date: start, end_date: None });
        }
        prop_assert_eq!(classify_regularity(&records), Regularity::Regular);
    }

    #[test]
    fn upcoming_events_bounded_future_and_sorted(
        cycle in 1u32..60,
        period in 1u32..15,
        anchor in anchor_strategy(),
        days_after in -30i64..120,
        horizon in 0u32..6,
    ) {
        let profile = UserCycleProfile::new(cycle, period, Some(anchor)).unwrap();
        let now = at(anchor) + Duration::days(days_after);
        let events = project_upcoming_events(&profile, &[], now, horizon);
        assert_bounded_future_sorted(&events, now)?;
    }

    #[test]
    fn upcoming_events_from_history_bounded_future_and_sorted(
        cycle in 1u32..60,
        period in 1u32..15,
        (records, newest) in history_strategy(),
        days_after in -30i64..120,
        horizon in 0u32..1_000,
    ) {
        let profile = UserCycleProfile::new(cycle, period, None).unwrap();
        let now = at(newest) + Duration::days(days_after);
        let events = project_upcoming_events(&profile, &records, now, horizon);
        assert_bounded_future_sorted(&events, now)?;
        if horizon > 0 && days_after < 10 {
            // The fertile window of the newest cycle is still ahead.
            prop_assert!(!events.is_empty());
        }
    }

    #[test]
    fn no_baseline_no_events(cycle in 1u32..60, period in 1u32..15, horizon in 0u32..6) {
        let profile = UserCycleProfile::new(cycle, period, None).unwrap();
        let events = project_upcoming_events(&profile, &[], at(base_date()), horizon);
        prop_assert!(events.is_empty());
    }
}
