//! Pure priority scoring.
//!
//! `score` maps a task and the current time to an integer priority. It is
//! side-effect free and never reads the clock itself; callers pass `now` so
//! repeated re-derivation (the scheduler recomputes on every ordering call)
//! stays deterministic for a fixed instant.

use crate::core::task::Task;
use chrono::{DateTime, Utc};

/// Points added for an overdue deadline.
const OVERDUE_SCORE: i64 = 200;
/// Points added for a deadline on the current calendar day.
const DUE_TODAY_SCORE: i64 = 100;
/// Age contribution cap, in points (one point per day since creation).
const AGE_CAP: i64 = 20;

/// Compute the priority score of a task at instant `now`.
///
/// Total = urgency * 10 (10..=100)
///       + deadline proximity component (0..=200)
///       + age component (0..=20).
///
/// Completed tasks are excluded from scheduling upstream; scoring one anyway
/// (e.g. for an export row) is well-defined and uses the same formula.
pub fn score(task: &Task, now: DateTime<Utc>) -> i64 {
    let base = i64::from(task.urgency) * 10;
    base + deadline_component(task.deadline, now) + age_component(task.created_at, now)
}

/// Deadline proximity component.
///
/// Banding, with boundary days always in the tighter band:
/// - overdue (deadline strictly before `now`): +200
/// - same UTC calendar day as `now`: +100
/// - 1..=3 days out: linear ramp 80, 50, 20
/// - 4..=7 days out: linear ramp 40, 29, 17, 5
/// - further out, or no deadline: 0
fn deadline_component(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(deadline) = deadline else {
        return 0;
    };

    if deadline < now {
        return OVERDUE_SCORE;
    }
    if deadline.date_naive() == now.date_naive() {
        return DUE_TODAY_SCORE;
    }

    // Whole calendar days until the deadline; >= 1 past the branches above.
    let days = (deadline.date_naive() - now.date_naive()).num_days();
    match days {
        1..=3 => 80 - (days - 1) * 30,
        4..=7 => 40 - (days - 4) * 35 / 3,
        _ => 0,
    }
}

/// Age component: one point per day since creation, capped at 20.
///
/// Clamped at zero from below so a clock that moved backwards past
/// `created_at` only flattens the component instead of panicking or going
/// negative.
fn age_component(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days().clamp(0, AGE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn make_task(urgency: u8, deadline: Option<DateTime<Utc>>) -> Task {
        Task {
            id: 1,
            title: "Test".to_string(),
            description: None,
            deadline,
            urgency,
            dependencies: BTreeSet::new(),
            created_at: now(),
            completed: false,
            completed_at: None,
        }
    }

    #[test]
    fn test_no_deadline_component_is_zero() {
        let task = make_task(5, None);
        assert_eq!(score(&task, now()), 50);
        // Still zero regardless of how far `now` drifts.
        assert_eq!(score(&task, now() + Duration::days(365)), 50 + 20);
    }

    #[test]
    fn test_overdue_scores_200() {
        let task = make_task(3, Some(now() - Duration::days(1)));
        assert_eq!(score(&task, now()), 30 + 200);
    }

    #[test]
    fn test_due_today_scores_100() {
        // Later the same day: not overdue, same calendar day.
        let task = make_task(5, Some(now() + Duration::hours(5)));
        assert_eq!(score(&task, now()), 50 + 100);
    }

    #[test]
    fn test_three_day_band_ramp() {
        for (days, expected) in [(1, 80), (2, 50), (3, 20)] {
            let task = make_task(1, Some(now() + Duration::days(days)));
            assert_eq!(score(&task, now()), 10 + expected, "day {days}");
        }
    }

    #[test]
    fn test_seven_day_band_ramp() {
        for (days, expected) in [(4, 40), (5, 29), (6, 17), (7, 5)] {
            let task = make_task(1, Some(now() + Duration::days(days)));
            assert_eq!(score(&task, now()), 10 + expected, "day {days}");
        }
    }

    #[test]
    fn test_beyond_seven_days_is_zero() {
        let task = make_task(10, Some(now() + Duration::days(8)));
        assert_eq!(score(&task, now()), 100);

        let task = make_task(10, Some(now() + Duration::days(10)));
        assert_eq!(score(&task, now()), 100);
    }

    #[test]
    fn test_boundary_days_fall_in_tighter_band() {
        // Exactly 3 days out scores the 3-day band floor, not the 7-day band.
        let task = make_task(1, Some(now() + Duration::days(3)));
        assert_eq!(score(&task, now()), 10 + 20);
        // Exactly 7 days out scores the 7-day band floor, not zero.
        let task = make_task(1, Some(now() + Duration::days(7)));
        assert_eq!(score(&task, now()), 10 + 5);
    }

    #[test]
    fn test_age_component_caps_at_20() {
        let mut task = make_task(5, None);
        task.created_at = now() - Duration::days(3);
        assert_eq!(score(&task, now()), 50 + 3);

        task.created_at = now() - Duration::days(20);
        assert_eq!(score(&task, now()), 50 + 20);

        task.created_at = now() - Duration::days(500);
        assert_eq!(score(&task, now()), 50 + 20);
    }

    #[test]
    fn test_age_monotone_in_elapsed_time() {
        let task = make_task(5, None);
        let mut last = score(&task, now());
        for d in 1..30 {
            let s = score(&task, now() + Duration::days(d));
            assert!(s >= last);
            last = s;
        }
    }

    #[test]
    fn test_clock_moving_backwards_does_not_underflow() {
        let task = make_task(5, None);
        // `now` before creation: age clamps to zero.
        assert_eq!(score(&task, now() - Duration::days(10)), 50);
    }

    #[test]
    fn test_overdue_low_urgency_outranks_far_future_high_urgency() {
        let x = make_task(3, Some(now() - Duration::days(1)));
        let y = make_task(10, Some(now() + Duration::days(10)));
        assert!(score(&x, now()) > score(&y, now()));
    }
}
