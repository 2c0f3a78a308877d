//! Daily completion streak.
//!
//! [`evaluate`] is a pure transition over `(streak, tasks, today)`. It may run
//! any number of times per day: once `last_date` is today, further
//! evaluations that day never increment again.

use crate::clock::Clock;
use crate::types::{Streak, Task};
use chrono::NaiveDate;

/// True when some done task was completed on `today`.
pub fn completed_on(tasks: &[Task], today: NaiveDate, clock: &dyn Clock) -> bool {
    tasks.iter().any(|t| {
        t.done
            && t
                .date_completed
                .is_some_and(|at| clock.day_of(at) == today)
    })
}

/// Advance the streak for the clock's current day.
pub fn evaluate(streak: Streak, tasks: &[Task], clock: &dyn Clock) -> Streak {
    let today = clock.today();
    transition(streak, completed_on(tasks, today, clock), today)
}

/// The transition itself, with the day and completion flag already resolved.
pub fn transition(streak: Streak, completed_today: bool, today: NaiveDate) -> Streak {
    let mut next = streak;
    let yesterday = today.pred_opt();

    if completed_today {
        if next.last_date.is_some() && next.last_date == yesterday {
            if next.last_date != Some(today) {
                next.count = next.count.saturating_add(1);
            }
        } else if next.last_date != Some(today) {
            next.count = 1;
        }
        next.last_date = Some(today);
    } else if next.last_date != Some(today) {
        next.count = 0;
        next.last_date = None;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_first_completion_starts_at_one() {
        let next = transition(Streak::default(), true, day(1));
        assert_eq!(next, Streak { count: 1, last_date: Some(day(1)) });
    }

    #[test]
    fn test_consecutive_day_increments() {
        let start = Streak { count: 3, last_date: Some(day(4)) };
        let next = transition(start, true, day(5));
        assert_eq!(next, Streak { count: 4, last_date: Some(day(5)) });
    }

    #[test]
    fn test_gap_restarts_at_one() {
        let start = Streak { count: 3, last_date: Some(day(2)) };
        let next = transition(start, true, day(5));
        assert_eq!(next, Streak { count: 1, last_date: Some(day(5)) });
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let start = Streak { count: 2, last_date: Some(day(5)) };
        assert_eq!(transition(start, true, day(5)), start);
        // Un-completing later the same day keeps the recorded day.
        assert_eq!(transition(start, false, day(5)), start);
    }

    #[test]
    fn test_no_completion_resets() {
        let start = Streak { count: 6, last_date: Some(day(4)) };
        assert_eq!(transition(start, false, day(5)), Streak::default());
        assert_eq!(transition(Streak::default(), false, day(5)), Streak::default());
    }
}
