//! crates/momentum_core/src/engine.rs
//!
//! The streak/replay state machine. Every function here is pure: it reads a
//! task snapshot and returns the patch and record storage should apply.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{CheckInReport, NewCheckIn, ReplayState, Task, TaskPatch};
use crate::error::DomainError;

/// How soon a committed replay becomes due, regardless of the task's interval.
pub const REPLAY_RETRY_WINDOW_MINUTES: i64 = 30;

/// Offered to the user after a defeat so they can commit to a smaller goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOffer {
    /// The target a successful replay would restore.
    pub original_target: i32,
    pub suggested_goal: i32,
}

/// The result of applying one check-in report to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub patch: TaskPatch,
    pub check_in: NewCheckIn,
    pub replay_offer: Option<ReplayOffer>,
}

/// Half the target, rounded up, never below one.
pub fn suggested_replay_goal(target: i32) -> i32 {
    ((target + 1) / 2).max(1)
}

/// Deactivated tasks are treated as absent.
fn ensure_active(task: &Task) -> Result<(), DomainError> {
    if !task.is_active {
        return Err(DomainError::NotFound(format!("Task {} not found", task.id)));
    }
    Ok(())
}

fn interval_from(task: &Task) -> Result<Duration, DomainError> {
    if task.interval_minutes <= 0 {
        return Err(DomainError::Validation(format!(
            "task {} has a non-positive interval of {} minutes",
            task.id, task.interval_minutes
        )));
    }
    Ok(Duration::minutes(i64::from(task.interval_minutes)))
}

/// Computes the task update and check-in record for one report.
///
/// The next check-in is always scheduled one interval after `now`. Replay
/// fields are only cleared by a successful, replay-flagged check-in against a
/// task that is actually in replay mode with a saved original target.
pub fn process_check_in(
    task: &Task,
    report: &CheckInReport,
    now: DateTime<Utc>,
) -> Result<CheckInOutcome, DomainError> {
    ensure_active(task)?;
    report.validate()?;
    let interval = interval_from(task)?;

    let mut patch = TaskPatch {
        next_checkin_at: Some(now + interval),
        ..TaskPatch::default()
    };

    if report.was_defeat {
        patch.streak = Some(0);
    } else {
        patch.streak = Some(task.streak.saturating_add(1));
        match (task.replay_state(), report.was_replay, task.original_target) {
            (ReplayState::InReplay, true, Some(original)) => {
                patch.target = Some(original);
                patch.is_in_replay_mode = Some(false);
                patch.replay_target = Some(None);
                patch.original_target = Some(None);
            }
            (ReplayState::Normal, true, _) => {
                debug!(task_id = %task.id, "replay check-in against a task not in replay mode");
            }
            _ => {}
        }
    }

    let replay_goal = match task.replay_state() {
        ReplayState::InReplay => Some(task.target),
        ReplayState::Normal => None,
    };
    if report.replay_goal.is_some() && report.replay_goal != replay_goal {
        debug!(
            task_id = %task.id,
            reported = ?report.replay_goal,
            recorded = ?replay_goal,
            "reported replay goal differs from task state"
        );
    }

    let check_in = NewCheckIn {
        task_id: task.id.clone(),
        user_id: task.user_id.clone(),
        value: report.value,
        was_defeat: report.was_defeat,
        was_replay: report.was_replay,
        replay_goal,
        checked_in_at: Some(now),
    };

    let replay_offer = report.was_defeat.then(|| ReplayOffer {
        original_target: task.original_target.unwrap_or(task.target),
        suggested_goal: suggested_replay_goal(task.target),
    });

    Ok(CheckInOutcome {
        patch,
        check_in,
        replay_offer,
    })
}

/// Computes the patch that puts a task into replay mode with a reduced goal.
///
/// An already-saved original target is kept, so committing twice never
/// records a reduced target as the one to restore.
pub fn commit_replay(
    task: &Task,
    replay_goal: i32,
    now: DateTime<Utc>,
) -> Result<TaskPatch, DomainError> {
    ensure_active(task)?;
    if replay_goal <= 0 {
        return Err(DomainError::Validation(format!(
            "replay goal must be positive, got {replay_goal}"
        )));
    }

    Ok(TaskPatch {
        is_in_replay_mode: Some(true),
        original_target: Some(Some(task.original_target.unwrap_or(task.target))),
        replay_target: Some(Some(replay_goal)),
        target: Some(replay_goal),
        next_checkin_at: Some(now + Duration::minutes(REPLAY_RETRY_WINDOW_MINUTES)),
        ..TaskPatch::default()
    })
}

/// Turns a direct user edit into the patch to store.
///
/// While the task is in replay mode its target is the replay goal, so a new
/// target is written to `replay_target` as well.
pub fn edit_task(task: &Task, edit: &TaskPatch) -> Result<TaskPatch, DomainError> {
    edit.validate_edit()?;
    let mut patch = edit.clone();
    if let (ReplayState::InReplay, Some(target)) = (task.replay_state(), edit.target) {
        patch.replay_target = Some(Some(target));
    }
    Ok(patch)
}
