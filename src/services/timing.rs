use time::PrimitiveDateTime;

/// Seconds left on the attempt clock, never negative. Recomputed from
/// `started_at` on every call; a submission arriving after the deadline
/// clamps to zero instead of being rejected.
pub(crate) fn time_remaining_seconds(
    time_limit_minutes: i32,
    started_at: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> i64 {
    let limit_seconds = i64::from(time_limit_minutes) * 60;
    let elapsed_seconds = (now - started_at).whole_seconds();
    (limit_seconds - elapsed_seconds).max(0)
}

/// Narrows a remaining-seconds value to the `i32` frozen on the attempt
/// row at submission. A limit large enough to overflow `i32` saturates
/// instead of wrapping negative.
pub(crate) fn frozen_clock_seconds(remaining_seconds: i64) -> i32 {
    i32::try_from(remaining_seconds).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn base() -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2026, time::Month::June, 1).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0).unwrap())
    }

    #[test]
    fn fresh_attempt_has_the_full_clock() {
        let started = base();
        assert_eq!(time_remaining_seconds(90, started, started), 90 * 60);
    }

    #[test]
    fn partial_elapsed_subtracts_whole_seconds() {
        let started = base();
        let now = started + Duration::minutes(25) + Duration::seconds(30);
        assert_eq!(time_remaining_seconds(90, started, now), 90 * 60 - 25 * 60 - 30);
    }

    #[test]
    fn past_deadline_clamps_to_zero() {
        let started = base();
        let now = started + Duration::minutes(91);
        assert_eq!(time_remaining_seconds(90, started, now), 0);

        let much_later = started + Duration::hours(48);
        assert_eq!(time_remaining_seconds(90, started, much_later), 0);
    }

    #[test]
    fn exact_deadline_is_zero() {
        let started = base();
        let now = started + Duration::minutes(90);
        assert_eq!(time_remaining_seconds(90, started, now), 0);
    }

    #[test]
    fn frozen_clock_keeps_ordinary_values() {
        assert_eq!(frozen_clock_seconds(0), 0);
        assert_eq!(frozen_clock_seconds(90 * 60), 90 * 60);
    }

    #[test]
    fn frozen_clock_saturates_instead_of_wrapping() {
        // i32::MAX minutes of limit leaves an i64 seconds value far past
        // what the attempt column can hold.
        let remaining = time_remaining_seconds(i32::MAX, base(), base());
        assert!(remaining > i64::from(i32::MAX));
        assert_eq!(frozen_clock_seconds(remaining), i32::MAX);
        assert_eq!(frozen_clock_seconds(i64::from(i32::MAX) + 1), i32::MAX);
    }
}
