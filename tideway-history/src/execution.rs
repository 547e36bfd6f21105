//! In-memory records behind the mutable-state surface.
//!
//! These are the persistence-shaped rows a mutable-state implementation
//! maintains between commits: one execution info per run, plus maps of
//! pending activities, user timers, child executions, and external
//! cancel/signal requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tideway_shared::{RetryPolicy, EMPTY_EVENT_ID};

/// Lifecycle state of a workflow execution row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    Created,
    Running,
    Completed,
}

/// Mutable execution metadata for one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecutionInfo {
    pub domain_id: String,
    pub workflow_id: String,
    pub run_id: String,

    pub parent_domain_id: Option<String>,
    pub parent_workflow_id: Option<String>,
    pub parent_run_id: Option<String>,
    /// Initiated-event id in the parent's history, when this is a child run.
    pub initiated_id: i64,

    pub task_list: String,
    pub workflow_type_name: String,
    /// Execution start-to-close timeout.
    pub workflow_timeout_seconds: i32,
    /// Decision-task start-to-close timeout.
    pub decision_start_to_close_timeout_seconds: i32,

    /// Next event id to assign; strictly monotonic per run.
    pub next_event_id: i64,
    pub state: WorkflowState,

    pub attempt: i32,
    pub cron_schedule: Option<String>,
    pub retry_policy: Option<RetryPolicy>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub last_completion_result: Option<Vec<u8>>,
}

impl WorkflowExecutionInfo {
    pub fn has_parent_execution(&self) -> bool {
        self.parent_workflow_id.is_some()
    }
}

/// One scheduled (possibly started) activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub schedule_id: i64,
    /// `EMPTY_EVENT_ID` until the activity task is started by a worker.
    pub started_id: i64,
    pub activity_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub schedule_to_close_timeout_seconds: i32,
    pub schedule_to_start_timeout_seconds: i32,
    pub start_to_close_timeout_seconds: i32,
    pub heartbeat_timeout_seconds: i32,
    pub attempt: i32,
    pub cancel_requested: bool,
    pub cancel_request_id: i64,
}

impl ActivityInfo {
    pub fn is_started(&self) -> bool {
        self.started_id != EMPTY_EVENT_ID
    }
}

/// One running user timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerInfo {
    pub timer_id: String,
    pub started_id: i64,
    pub expiry_time: DateTime<Utc>,
    pub task_id: i64,
}

/// One initiated child workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildExecutionInfo {
    pub initiated_id: i64,
    pub started_id: i64,
    pub create_request_id: String,
    pub workflow_id: String,
    pub workflow_type_name: String,
    pub domain_id: String,
}

/// One initiated external-cancel request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCancelInfo {
    pub initiated_id: i64,
    pub cancel_request_id: String,
}

/// One initiated external-signal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    pub initiated_id: i64,
    pub signal_request_id: String,
    pub signal_name: String,
}
