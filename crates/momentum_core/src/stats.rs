//! crates/momentum_core/src/stats.rs
//!
//! Read-only rollups over check-in history.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::domain::{CheckIn, Task};

/// Totals for one task. Defeats never count towards a total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskStats {
    pub today_total: i64,
    pub week_total: i64,
    pub month_total: i64,
    /// Percentage of replay check-ins that were not defeats.
    pub replay_success_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    /// Percentage of tasks with any progress today.
    pub momentum_score: u32,
    pub replay_success_rate: u32,
}

/// One calendar day of activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub total: i64,
    pub had_defeat: bool,
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::default()))
}

fn total_since(check_ins: &[CheckIn], since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    check_ins
        .iter()
        .filter(|c| !c.was_defeat && c.checked_in_at >= since && c.checked_in_at <= now)
        .map(|c| i64::from(c.value))
        .sum()
}

pub fn task_stats(check_ins: &[CheckIn], now: DateTime<Utc>) -> TaskStats {
    let today = start_of_day(now);
    let week_ago = now - Duration::days(7);
    let month_ago = now
        .checked_sub_months(Months::new(1))
        .unwrap_or(now - Duration::days(30));

    let (replays, successful_replays) = check_ins
        .iter()
        .filter(|c| c.was_replay)
        .fold((0u32, 0u32), |(all, ok), c| {
            (all + 1, ok + u32::from(!c.was_defeat))
        });
    let replay_success_rate = if replays > 0 {
        f64::from(successful_replays) / f64::from(replays) * 100.0
    } else {
        0.0
    };

    TaskStats {
        today_total: total_since(check_ins, today, now),
        week_total: total_since(check_ins, week_ago, now),
        month_total: total_since(check_ins, month_ago, now),
        replay_success_rate,
    }
}

pub fn global_stats(tasks: &[Task], per_task: &[TaskStats]) -> GlobalStats {
    if tasks.is_empty() {
        return GlobalStats {
            momentum_score: 0,
            replay_success_rate: 0,
        };
    }

    let active_today = per_task.iter().filter(|s| s.today_total > 0).count();
    let momentum = active_today as f64 / tasks.len() as f64 * 100.0;

    let replay = if per_task.is_empty() {
        0.0
    } else {
        per_task.iter().map(|s| s.replay_success_rate).sum::<f64>() / per_task.len() as f64
    };

    GlobalStats {
        momentum_score: momentum.round() as u32,
        replay_success_rate: replay.round() as u32,
    }
}

/// Groups check-ins by UTC calendar day, oldest day first.
pub fn daily_activity(check_ins: &[CheckIn]) -> Vec<DayActivity> {
    let mut days: BTreeMap<NaiveDate, DayActivity> = BTreeMap::new();
    for check_in in check_ins {
        let date = check_in.checked_in_at.date_naive();
        let day = days.entry(date).or_insert(DayActivity {
            date,
            total: 0,
            had_defeat: false,
        });
        if check_in.was_defeat {
            day.had_defeat = true;
        } else {
            day.total += i64::from(check_in.value);
        }
    }
    days.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricType;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 15, 30, 0).unwrap()
    }

    fn check_in(value: i32, was_defeat: bool, was_replay: bool, at: DateTime<Utc>) -> CheckIn {
        CheckIn {
            id: format!("c-{value}-{}", at.timestamp()),
            task_id: "t".into(),
            user_id: "u".into(),
            value,
            was_defeat,
            was_replay,
            replay_goal: None,
            checked_in_at: at,
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            user_id: "u".into(),
            name: id.into(),
            category: "General".into(),
            metric_type: MetricType::Count,
            target: 10,
            interval_minutes: 60,
            streak: 0,
            is_active: true,
            next_checkin_at: now(),
            is_in_replay_mode: false,
            replay_target: None,
            original_target: None,
            created_at: now(),
            version: 0,
        }
    }

    #[test]
    fn defeats_are_excluded_from_totals() {
        let earlier = now() - Duration::hours(2);
        let history = vec![
            check_in(10, false, false, earlier),
            check_in(5, true, false, earlier),
            check_in(7, false, true, earlier),
        ];
        let stats = task_stats(&history, now());
        assert_eq!(stats.today_total, 17);
        assert_eq!(stats.week_total, 17);
        assert_eq!(stats.month_total, 17);
    }

    #[test]
    fn windows_follow_midnight_week_and_month() {
        let history = vec![
            check_in(1, false, false, now() - Duration::hours(1)),
            check_in(2, false, false, start_of_day(now()) - Duration::minutes(1)),
            check_in(4, false, false, now() - Duration::days(6)),
            check_in(8, false, false, now() - Duration::days(20)),
            check_in(16, false, false, now() - Duration::days(40)),
        ];
        let stats = task_stats(&history, now());
        assert_eq!(stats.today_total, 1);
        assert_eq!(stats.week_total, 7);
        assert_eq!(stats.month_total, 15);
    }

    #[test]
    fn replay_rate_is_zero_without_replays() {
        let history = vec![check_in(3, false, false, now())];
        assert_eq!(task_stats(&history, now()).replay_success_rate, 0.0);
        assert_eq!(task_stats(&[], now()).replay_success_rate, 0.0);
    }

    #[test]
    fn replay_rate_counts_non_defeat_replays() {
        let history = vec![
            check_in(3, false, true, now()),
            check_in(0, true, true, now()),
            check_in(0, true, true, now()),
            check_in(3, false, true, now()),
            check_in(9, true, false, now()),
        ];
        assert_eq!(task_stats(&history, now()).replay_success_rate, 50.0);
    }

    #[test]
    fn global_stats_rounds_percentages() {
        let tasks = vec![task("a"), task("b"), task("c")];
        let per_task = vec![
            TaskStats {
                today_total: 5,
                week_total: 5,
                month_total: 5,
                replay_success_rate: 100.0,
            },
            TaskStats {
                today_total: 0,
                week_total: 3,
                month_total: 3,
                replay_success_rate: 50.0,
            },
            TaskStats {
                today_total: 0,
                week_total: 0,
                month_total: 0,
                replay_success_rate: 0.0,
            },
        ];
        let global = global_stats(&tasks, &per_task);
        assert_eq!(global.momentum_score, 33);
        assert_eq!(global.replay_success_rate, 50);
        assert_eq!(
            global_stats(&[], &[]),
            GlobalStats {
                momentum_score: 0,
                replay_success_rate: 0
            }
        );
    }

    #[test]
    fn daily_activity_groups_by_day() {
        let yesterday = now() - Duration::days(1);
        let history = vec![
            check_in(4, false, false, now()),
            check_in(6, false, false, now() - Duration::hours(1)),
            check_in(2, true, false, yesterday),
        ];
        let days = daily_activity(&history);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, yesterday.date_naive());
        assert_eq!(days[0].total, 0);
        assert!(days[0].had_defeat);
        assert_eq!(days[1].total, 10);
        assert!(!days[1].had_defeat);
    }
}
