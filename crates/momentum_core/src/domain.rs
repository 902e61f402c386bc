//! crates/momentum_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// What a task's target and check-in values measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Minutes spent.
    Duration,
    /// Repetitions completed.
    Count,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Duration => "duration",
            MetricType::Count => "count",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "duration" => Ok(MetricType::Duration),
            "count" => Ok(MetricType::Count),
            other => Err(DomainError::Validation(format!(
                "metric type must be 'duration' or 'count', got '{other}'"
            ))),
        }
    }
}

/// The two states of the streak/replay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Normal,
    InReplay,
}

/// A recurring habit with a target and a check-in cadence.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub metric_type: MetricType,
    /// The goal currently in effect (the replay target while in replay mode).
    pub target: i32,
    pub interval_minutes: i32,
    pub streak: i32,
    pub is_active: bool,
    pub next_checkin_at: DateTime<Utc>,
    pub is_in_replay_mode: bool,
    pub replay_target: Option<i32>,
    /// The pre-replay target, restored after a successful replay.
    pub original_target: Option<i32>,
    pub created_at: DateTime<Utc>,
    /// Bumped by storage on every write; used for conditional updates.
    pub version: i64,
}

impl Task {
    pub fn replay_state(&self) -> ReplayState {
        if self.is_in_replay_mode {
            ReplayState::InReplay
        } else {
            ReplayState::Normal
        }
    }
}

/// An immutable record of one submitted check-in.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub value: i32,
    pub was_defeat: bool,
    pub was_replay: bool,
    pub replay_goal: Option<i32>,
    pub checked_in_at: DateTime<Utc>,
}

/// A user's report of progress for the current interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInReport {
    pub value: i32,
    pub was_defeat: bool,
    /// Whether the client believed the task was in replay mode.
    pub was_replay: bool,
    pub replay_goal: Option<i32>,
}

impl CheckInReport {
    pub fn success(value: i32) -> Self {
        Self {
            value,
            was_defeat: false,
            was_replay: false,
            replay_goal: None,
        }
    }

    pub fn defeat() -> Self {
        Self {
            value: 0,
            was_defeat: true,
            was_replay: false,
            replay_goal: None,
        }
    }

    pub fn replaying(mut self, replay_goal: Option<i32>) -> Self {
        self.was_replay = true;
        self.replay_goal = replay_goal;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.value < 0 {
            return Err(DomainError::Validation(format!(
                "check-in value must be non-negative, got {}",
                self.value
            )));
        }
        Ok(())
    }
}

/// The fields a user supplies when creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub category: String,
    pub metric_type: MetricType,
    pub target: i32,
    pub interval_minutes: i32,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("task name must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::Validation(
                "task category must not be empty".into(),
            ));
        }
        if self.target <= 0 {
            return Err(DomainError::Validation(format!(
                "target must be positive, got {}",
                self.target
            )));
        }
        if self.interval_minutes <= 0 {
            return Err(DomainError::Validation(format!(
                "interval must be positive, got {} minutes",
                self.interval_minutes
            )));
        }
        Ok(())
    }
}

/// A merge-patch over a task's mutable fields.
///
/// `None` leaves a field untouched. The nullable replay columns use a nested
/// option so that `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub metric_type: Option<MetricType>,
    pub target: Option<i32>,
    pub interval_minutes: Option<i32>,
    pub streak: Option<i32>,
    pub is_active: Option<bool>,
    pub next_checkin_at: Option<DateTime<Utc>>,
    pub is_in_replay_mode: Option<bool>,
    pub replay_target: Option<Option<i32>>,
    pub original_target: Option<Option<i32>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Applies the patch to an in-memory task.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(metric_type) = self.metric_type {
            task.metric_type = metric_type;
        }
        if let Some(target) = self.target {
            task.target = target;
        }
        if let Some(interval) = self.interval_minutes {
            task.interval_minutes = interval;
        }
        if let Some(streak) = self.streak {
            task.streak = streak;
        }
        if let Some(is_active) = self.is_active {
            task.is_active = is_active;
        }
        if let Some(next) = self.next_checkin_at {
            task.next_checkin_at = next;
        }
        if let Some(in_replay) = self.is_in_replay_mode {
            task.is_in_replay_mode = in_replay;
        }
        if let Some(replay_target) = self.replay_target {
            task.replay_target = replay_target;
        }
        if let Some(original_target) = self.original_target {
            task.original_target = original_target;
        }
    }

    /// Validates the user-editable fields of a direct edit.
    pub fn validate_edit(&self) -> Result<(), DomainError> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::Validation("task name must not be empty".into()));
        }
        if matches!(&self.category, Some(category) if category.trim().is_empty()) {
            return Err(DomainError::Validation(
                "task category must not be empty".into(),
            ));
        }
        if matches!(self.target, Some(target) if target <= 0) {
            return Err(DomainError::Validation("target must be positive".into()));
        }
        if matches!(self.interval_minutes, Some(interval) if interval <= 0) {
            return Err(DomainError::Validation("interval must be positive".into()));
        }
        Ok(())
    }
}

/// A check-in about to be appended. Storage assigns the id, and the
/// timestamp when none is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckIn {
    pub task_id: String,
    pub user_id: String,
    pub value: i32,
    pub was_defeat: bool,
    pub was_replay: bool,
    pub replay_goal: Option<i32>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

// Represents a user - created on first sight of an authenticated id
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user-defined category label for grouping tasks.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A free-text reflection written by a user.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
