//! crates/momentum_core/src/clock.rs
//!
//! Due-ness of a task relative to a point in time. Side-effect free, so
//! pollers may call these as often as they like.

use chrono::{DateTime, Duration, Utc};

use crate::domain::Task;

/// True once `now` has reached the task's next check-in (inclusive).
pub fn is_due(task: &Task, now: DateTime<Utc>) -> bool {
    now >= task.next_checkin_at
}

/// Whole minutes past the next check-in, or zero if not yet due.
pub fn overdue_minutes(task: &Task, now: DateTime<Utc>) -> i64 {
    (now - task.next_checkin_at).num_minutes().max(0)
}

/// Percentage (0 to 100) of the current interval that has elapsed.
pub fn progress_fraction(task: &Task, now: DateTime<Utc>) -> f64 {
    if task.interval_minutes <= 0 {
        return 0.0;
    }
    let interval = Duration::minutes(i64::from(task.interval_minutes));
    let start = task.next_checkin_at - interval;
    let elapsed_ms = (now - start).num_milliseconds() as f64;
    let interval_ms = interval.num_milliseconds() as f64;
    (100.0 * elapsed_ms / interval_ms).clamp(0.0, 100.0)
}
