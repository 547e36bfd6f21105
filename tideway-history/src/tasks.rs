//! Transfer and timer tasks emitted by the decision-task handler.
//!
//! Both are closed unions so the queue processors dispatch exhaustively.
//! Every task references an event id created earlier in the same batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tideway_shared::TimeoutType;

/// Queued side effect destined for another component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransferTask {
    /// Dispatch an activity task to matching.
    ActivityTask {
        target_domain_id: String,
        task_list: String,
        schedule_id: i64,
    },
    /// Start an initiated child workflow execution.
    StartChildExecution {
        target_domain_id: String,
        target_workflow_id: String,
        initiated_id: i64,
    },
    /// Deliver an external cancellation request.
    CancelExecution {
        target_domain_id: String,
        target_workflow_id: String,
        target_run_id: Option<String>,
        target_child_workflow_only: bool,
        initiated_id: i64,
    },
    /// Deliver an external signal.
    SignalExecution {
        target_domain_id: String,
        target_workflow_id: String,
        target_run_id: Option<String>,
        target_child_workflow_only: bool,
        initiated_id: i64,
    },
}

/// Queued wake-up destined for the timer queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimerTask {
    /// A user timer coming due.
    UserTimer {
        visibility_time: DateTime<Utc>,
        event_id: i64,
    },
    /// A system timeout on a pending activity.
    ActivityTimeout {
        visibility_time: DateTime<Utc>,
        timeout_type: TimeoutType,
        event_id: i64,
        attempt: i32,
    },
}

impl TimerTask {
    pub fn visibility_time(&self) -> DateTime<Utc> {
        match self {
            TimerTask::UserTimer {
                visibility_time, ..
            }
            | TimerTask::ActivityTimeout {
                visibility_time, ..
            } => *visibility_time,
        }
    }
}
