//! Shared types for the tideway workflow service.
//!
//! These types form the data model for workflow execution: history events,
//! decisions and their attribute records, and the supporting identifier and
//! policy types. The history service appends events; deciders respond to
//! decision tasks with lists of [`Decision`] values.

use serde::{Deserialize, Serialize};

/// First event id of every run; the start event always carries it.
pub const FIRST_EVENT_ID: i64 = 1;

/// Reserved sentinel for an event id that is not set (e.g. an activity that
/// has not started yet).
pub const EMPTY_EVENT_ID: i64 = -23;

/// Reserved sentinel for a task id that is not set.
pub const EMPTY_TASK_ID: i64 = -1;

/// Termination reason stamped when a decision payload exceeds the blob size
/// error limit.
pub const TERMINATE_REASON_PAYLOAD_SIZE_EXCEEDS_LIMIT: &str = "PayloadSizeExceedsLimit";

/// Unique identifier for a workflow execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// The workflow ID (user-defined or system-generated)
    pub workflow_id: String,
    /// The run ID (unique for each run of a workflow)
    pub run_id: String,
}

impl WorkflowExecution {
    pub fn new(workflow_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }
}

/// Workflow type information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
}

impl WorkflowType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Activity type information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub name: String,
}

impl ActivityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Task list identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskList {
    pub name: String,
    pub kind: TaskListKind,
}

impl TaskList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TaskListKind::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TaskListKind {
    Normal = 0,
    Sticky = 1,
}

/// Retry policy for activities and workflows, seconds granularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_interval_in_seconds: i32,
    pub backoff_coefficient: f64,
    pub maximum_interval_in_seconds: i32,
    pub maximum_attempts: i32,
    pub non_retryable_error_reasons: Vec<String>,
    pub expiration_interval_in_seconds: i32,
}

/// Header for passing context information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    pub fields: std::collections::HashMap<String, Vec<u8>>,
}

/// Memo attached to a workflow execution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Memo {
    pub fields: std::collections::HashMap<String, Vec<u8>>,
}

/// Search attributes for workflow visibility
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchAttributes {
    pub indexed_fields: std::collections::HashMap<String, Vec<u8>>,
}

/// Parent close policy for child workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum ParentClosePolicy {
    #[default]
    Terminate = 0,
    RequestCancel = 1,
    Abandon = 2,
}

/// Workflow ID reuse policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum WorkflowIdReusePolicy {
    #[default]
    AllowDuplicateFailedOnly = 0,
    AllowDuplicate = 1,
    RejectDuplicate = 2,
    TerminateIfRunning = 3,
}

/// Who initiated a continue-as-new transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ContinueAsNewInitiator {
    Decider = 0,
    RetryPolicy = 1,
    CronSchedule = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum TimeoutType {
    StartToClose = 0,
    ScheduleToStart = 1,
    ScheduleToClose = 2,
    Heartbeat = 3,
}

/// Why a decision task was failed by the history service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DecisionTaskFailedCause {
    UnhandledDecision = 0,
    BadScheduleActivityAttributes = 1,
    BadRequestCancelActivityAttributes = 2,
    BadStartTimerAttributes = 3,
    BadCancelTimerAttributes = 4,
    BadRecordMarkerAttributes = 5,
    BadCompleteWorkflowExecutionAttributes = 6,
    BadFailWorkflowExecutionAttributes = 7,
    BadCancelWorkflowExecutionAttributes = 8,
    BadRequestCancelExternalWorkflowExecutionAttributes = 9,
    BadSignalWorkflowExecutionAttributes = 10,
    BadContinueAsNewAttributes = 11,
    StartTimerDuplicateId = 12,
    ScheduleActivityDuplicateId = 13,
    BadStartChildExecutionAttributes = 14,
    ForceCloseDecision = 15,
    FailoverCloseDecision = 16,
}

impl DecisionTaskFailedCause {
    /// Whether the caller should schedule a new decision task after
    /// committing the decision-task-failed event.
    pub fn retries_decision_task(&self) -> bool {
        !matches!(
            self,
            DecisionTaskFailedCause::ForceCloseDecision
                | DecisionTaskFailedCause::FailoverCloseDecision
        )
    }
}

/// Represents a single event in workflow history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_id: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: EventType,
    /// Failover version stamping the cluster that authored the event
    pub version: i64,
    pub task_id: i64,
    pub attributes: Option<EventAttributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum EventType {
    WorkflowExecutionStarted = 0,
    WorkflowExecutionCompleted = 1,
    WorkflowExecutionFailed = 2,
    WorkflowExecutionTimedOut = 3,
    DecisionTaskScheduled = 4,
    DecisionTaskStarted = 5,
    DecisionTaskCompleted = 6,
    DecisionTaskTimedOut = 7,
    DecisionTaskFailed = 8,
    ActivityTaskScheduled = 9,
    ActivityTaskStarted = 10,
    ActivityTaskCompleted = 11,
    ActivityTaskFailed = 12,
    ActivityTaskTimedOut = 13,
    ActivityTaskCancelRequested = 14,
    ActivityTaskCanceled = 15,
    TimerStarted = 16,
    TimerFired = 17,
    TimerCanceled = 18,
    WorkflowExecutionCancelRequested = 19,
    WorkflowExecutionCanceled = 20,
    RequestCancelExternalWorkflowExecutionInitiated = 21,
    RequestCancelExternalWorkflowExecutionFailed = 22,
    ExternalWorkflowExecutionCancelRequested = 23,
    MarkerRecorded = 24,
    WorkflowExecutionSignaled = 25,
    WorkflowExecutionTerminated = 26,
    SignalExternalWorkflowExecutionInitiated = 27,
    SignalExternalWorkflowExecutionFailed = 28,
    ExternalWorkflowExecutionSignaled = 29,
    CancelTimerFailed = 30,
    RequestCancelActivityTaskFailed = 31,
    WorkflowExecutionContinuedAsNew = 32,
    StartChildWorkflowExecutionInitiated = 35,
    ChildWorkflowExecutionStarted = 36,
    ChildWorkflowExecutionCompleted = 37,
    ChildWorkflowExecutionFailed = 38,
    ChildWorkflowExecutionTimedOut = 39,
    ChildWorkflowExecutionCanceled = 40,
    ChildWorkflowExecutionTerminated = 41,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventAttributes {
    WorkflowExecutionStartedEventAttributes(Box<WorkflowExecutionStartedEventAttributes>),
    WorkflowExecutionCompletedEventAttributes(Box<WorkflowExecutionCompletedEventAttributes>),
    WorkflowExecutionFailedEventAttributes(Box<WorkflowExecutionFailedEventAttributes>),
    WorkflowExecutionCanceledEventAttributes(Box<WorkflowExecutionCanceledEventAttributes>),
    WorkflowExecutionTerminatedEventAttributes(Box<WorkflowExecutionTerminatedEventAttributes>),
    WorkflowExecutionContinuedAsNewEventAttributes(
        Box<WorkflowExecutionContinuedAsNewEventAttributes>,
    ),
    WorkflowExecutionSignaledEventAttributes(Box<WorkflowExecutionSignaledEventAttributes>),
    DecisionTaskScheduledEventAttributes(Box<DecisionTaskScheduledEventAttributes>),
    DecisionTaskStartedEventAttributes(Box<DecisionTaskStartedEventAttributes>),
    DecisionTaskCompletedEventAttributes(Box<DecisionTaskCompletedEventAttributes>),
    DecisionTaskFailedEventAttributes(Box<DecisionTaskFailedEventAttributes>),
    ActivityTaskScheduledEventAttributes(Box<ActivityTaskScheduledEventAttributes>),
    ActivityTaskStartedEventAttributes(Box<ActivityTaskStartedEventAttributes>),
    ActivityTaskCancelRequestedEventAttributes(Box<ActivityTaskCancelRequestedEventAttributes>),
    ActivityTaskCanceledEventAttributes(Box<ActivityTaskCanceledEventAttributes>),
    RequestCancelActivityTaskFailedEventAttributes(
        Box<RequestCancelActivityTaskFailedEventAttributes>,
    ),
    TimerStartedEventAttributes(Box<TimerStartedEventAttributes>),
    TimerFiredEventAttributes(Box<TimerFiredEventAttributes>),
    TimerCanceledEventAttributes(Box<TimerCanceledEventAttributes>),
    CancelTimerFailedEventAttributes(Box<CancelTimerFailedEventAttributes>),
    MarkerRecordedEventAttributes(Box<MarkerRecordedEventAttributes>),
    StartChildWorkflowExecutionInitiatedEventAttributes(
        Box<StartChildWorkflowExecutionInitiatedEventAttributes>,
    ),
    RequestCancelExternalWorkflowExecutionInitiatedEventAttributes(
        Box<RequestCancelExternalWorkflowExecutionInitiatedEventAttributes>,
    ),
    SignalExternalWorkflowExecutionInitiatedEventAttributes(
        Box<SignalExternalWorkflowExecutionInitiatedEventAttributes>,
    ),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionStartedEventAttributes {
    pub workflow_type: Option<WorkflowType>,
    pub parent_workflow_domain: Option<String>,
    pub parent_workflow_execution: Option<WorkflowExecution>,
    pub parent_initiated_event_id: Option<i64>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: i32,
    pub task_start_to_close_timeout_seconds: i32,
    pub identity: String,
    pub continued_execution_run_id: Option<String>,
    pub initiator: Option<ContinueAsNewInitiator>,
    pub continued_failure_reason: Option<String>,
    pub continued_failure_details: Option<Vec<u8>>,
    pub last_completion_result: Option<Vec<u8>>,
    pub original_execution_run_id: Option<String>,
    pub first_execution_run_id: Option<String>,
    pub retry_policy: Option<RetryPolicy>,
    pub attempt: i32,
    pub expiration_timestamp: Option<i64>,
    pub cron_schedule: Option<String>,
    pub first_decision_task_backoff_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionCompletedEventAttributes {
    pub result: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionFailedEventAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionCanceledEventAttributes {
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionTerminatedEventAttributes {
    pub reason: String,
    pub details: Option<Vec<u8>>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionContinuedAsNewEventAttributes {
    pub new_execution_run_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: i32,
    pub task_start_to_close_timeout_seconds: i32,
    pub decision_task_completed_event_id: i64,
    pub backoff_start_interval_in_seconds: i32,
    pub initiator: Option<ContinueAsNewInitiator>,
    pub failure_reason: Option<String>,
    pub failure_details: Option<Vec<u8>>,
    pub last_completion_result: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecutionSignaledEventAttributes {
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskScheduledEventAttributes {
    pub task_list: Option<TaskList>,
    pub start_to_close_timeout_seconds: i32,
    pub attempt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskStartedEventAttributes {
    pub scheduled_event_id: i64,
    pub identity: String,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskCompletedEventAttributes {
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
    pub binary_checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTaskFailedEventAttributes {
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub cause: DecisionTaskFailedCause,
    pub details: Option<Vec<u8>>,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskScheduledEventAttributes {
    pub activity_id: String,
    pub activity_type: Option<ActivityType>,
    pub domain: Option<String>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub schedule_to_close_timeout_seconds: Option<i32>,
    pub schedule_to_start_timeout_seconds: Option<i32>,
    pub start_to_close_timeout_seconds: Option<i32>,
    pub heartbeat_timeout_seconds: Option<i32>,
    pub decision_task_completed_event_id: i64,
    pub retry_policy: Option<RetryPolicy>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskStartedEventAttributes {
    pub scheduled_event_id: i64,
    pub identity: String,
    pub request_id: String,
    pub attempt: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCancelRequestedEventAttributes {
    pub activity_id: String,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTaskCanceledEventAttributes {
    pub details: Option<Vec<u8>>,
    pub latest_cancel_requested_event_id: i64,
    pub scheduled_event_id: i64,
    pub started_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelActivityTaskFailedEventAttributes {
    pub activity_id: String,
    pub cause: String,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerStartedEventAttributes {
    pub timer_id: String,
    pub start_to_fire_timeout_seconds: i64,
    pub decision_task_completed_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerFiredEventAttributes {
    pub timer_id: String,
    pub started_event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCanceledEventAttributes {
    pub timer_id: String,
    pub started_event_id: i64,
    pub decision_task_completed_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelTimerFailedEventAttributes {
    pub timer_id: String,
    pub cause: String,
    pub decision_task_completed_event_id: i64,
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecordedEventAttributes {
    pub marker_name: String,
    pub details: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionInitiatedEventAttributes {
    pub domain: Option<String>,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub parent_close_policy: Option<ParentClosePolicy>,
    pub control: Option<Vec<u8>>,
    pub decision_task_completed_event_id: i64,
    pub workflow_id_reuse_policy: Option<WorkflowIdReusePolicy>,
    pub retry_policy: Option<RetryPolicy>,
    pub cron_schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionInitiatedEventAttributes {
    pub decision_task_completed_event_id: i64,
    pub domain: Option<String>,
    pub workflow_execution: Option<WorkflowExecution>,
    pub control: Option<Vec<u8>>,
    pub child_workflow_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionInitiatedEventAttributes {
    pub decision_task_completed_event_id: i64,
    pub domain: Option<String>,
    pub workflow_execution: Option<WorkflowExecution>,
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub control: Option<Vec<u8>>,
    pub child_workflow_only: bool,
}

/// Numeric decision tags as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DecisionType {
    ScheduleActivityTask = 0,
    RequestCancelActivityTask = 1,
    StartTimer = 2,
    CompleteWorkflowExecution = 3,
    FailWorkflowExecution = 4,
    CancelTimer = 5,
    CancelWorkflowExecution = 6,
    RequestCancelExternalWorkflowExecution = 7,
    RecordMarker = 8,
    ContinueAsNewWorkflowExecution = 9,
    StartChildWorkflowExecution = 10,
    SignalExternalWorkflowExecution = 11,
}

impl TryFrom<i32> for DecisionType {
    type Error = crate::error::ServiceError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DecisionType::ScheduleActivityTask),
            1 => Ok(DecisionType::RequestCancelActivityTask),
            2 => Ok(DecisionType::StartTimer),
            3 => Ok(DecisionType::CompleteWorkflowExecution),
            4 => Ok(DecisionType::FailWorkflowExecution),
            5 => Ok(DecisionType::CancelTimer),
            6 => Ok(DecisionType::CancelWorkflowExecution),
            7 => Ok(DecisionType::RequestCancelExternalWorkflowExecution),
            8 => Ok(DecisionType::RecordMarker),
            9 => Ok(DecisionType::ContinueAsNewWorkflowExecution),
            10 => Ok(DecisionType::StartChildWorkflowExecution),
            11 => Ok(DecisionType::SignalExternalWorkflowExecution),
            _ => Err(crate::error::ServiceError::bad_request(format!(
                "Unknown decision type: {value}"
            ))),
        }
    }
}

/// One instruction from a decider.
///
/// A closed union: the history service dispatches on the variant, so the
/// compiler enforces that every decision kind is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decision {
    ScheduleActivityTask(Box<ScheduleActivityTaskDecisionAttributes>),
    RequestCancelActivityTask(Box<RequestCancelActivityTaskDecisionAttributes>),
    StartTimer(Box<StartTimerDecisionAttributes>),
    CancelTimer(Box<CancelTimerDecisionAttributes>),
    CompleteWorkflowExecution(Box<CompleteWorkflowExecutionDecisionAttributes>),
    FailWorkflowExecution(Box<FailWorkflowExecutionDecisionAttributes>),
    CancelWorkflowExecution(Box<CancelWorkflowExecutionDecisionAttributes>),
    RecordMarker(Box<RecordMarkerDecisionAttributes>),
    ContinueAsNewWorkflowExecution(Box<ContinueAsNewWorkflowExecutionDecisionAttributes>),
    StartChildWorkflowExecution(Box<StartChildWorkflowExecutionDecisionAttributes>),
    RequestCancelExternalWorkflowExecution(
        Box<RequestCancelExternalWorkflowExecutionDecisionAttributes>,
    ),
    SignalExternalWorkflowExecution(Box<SignalExternalWorkflowExecutionDecisionAttributes>),
}

impl Decision {
    pub fn decision_type(&self) -> DecisionType {
        match self {
            Decision::ScheduleActivityTask(_) => DecisionType::ScheduleActivityTask,
            Decision::RequestCancelActivityTask(_) => DecisionType::RequestCancelActivityTask,
            Decision::StartTimer(_) => DecisionType::StartTimer,
            Decision::CancelTimer(_) => DecisionType::CancelTimer,
            Decision::CompleteWorkflowExecution(_) => DecisionType::CompleteWorkflowExecution,
            Decision::FailWorkflowExecution(_) => DecisionType::FailWorkflowExecution,
            Decision::CancelWorkflowExecution(_) => DecisionType::CancelWorkflowExecution,
            Decision::RecordMarker(_) => DecisionType::RecordMarker,
            Decision::ContinueAsNewWorkflowExecution(_) => {
                DecisionType::ContinueAsNewWorkflowExecution
            }
            Decision::StartChildWorkflowExecution(_) => DecisionType::StartChildWorkflowExecution,
            Decision::RequestCancelExternalWorkflowExecution(_) => {
                DecisionType::RequestCancelExternalWorkflowExecution
            }
            Decision::SignalExternalWorkflowExecution(_) => {
                DecisionType::SignalExternalWorkflowExecution
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleActivityTaskDecisionAttributes {
    pub activity_id: String,
    pub activity_type: Option<ActivityType>,
    /// Target domain; empty means the workflow's own domain
    pub domain: Option<String>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub schedule_to_close_timeout_seconds: Option<i32>,
    pub schedule_to_start_timeout_seconds: Option<i32>,
    pub start_to_close_timeout_seconds: Option<i32>,
    pub heartbeat_timeout_seconds: Option<i32>,
    pub retry_policy: Option<RetryPolicy>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestCancelActivityTaskDecisionAttributes {
    pub activity_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartTimerDecisionAttributes {
    pub timer_id: String,
    pub start_to_fire_timeout_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CancelTimerDecisionAttributes {
    pub timer_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompleteWorkflowExecutionDecisionAttributes {
    pub result: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FailWorkflowExecutionDecisionAttributes {
    pub reason: Option<String>,
    pub details: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CancelWorkflowExecutionDecisionAttributes {
    pub details: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordMarkerDecisionAttributes {
    pub marker_name: String,
    pub details: Option<Vec<u8>>,
    pub header: Option<Header>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContinueAsNewWorkflowExecutionDecisionAttributes {
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub backoff_start_interval_in_seconds: Option<i32>,
    pub retry_policy: Option<RetryPolicy>,
    pub initiator: Option<ContinueAsNewInitiator>,
    pub failure_reason: Option<String>,
    pub failure_details: Option<Vec<u8>>,
    pub last_completion_result: Option<Vec<u8>>,
    pub cron_schedule: Option<String>,
    pub header: Option<Header>,
    pub memo: Option<Memo>,
    pub search_attributes: Option<SearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartChildWorkflowExecutionDecisionAttributes {
    /// Target domain; empty means the parent workflow's domain
    pub domain: Option<String>,
    pub workflow_id: String,
    pub workflow_type: Option<WorkflowType>,
    pub task_list: Option<TaskList>,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout_seconds: Option<i32>,
    pub task_start_to_close_timeout_seconds: Option<i32>,
    pub parent_close_policy: Option<ParentClosePolicy>,
    pub control: Option<Vec<u8>>,
    pub workflow_id_reuse_policy: Option<WorkflowIdReusePolicy>,
    pub retry_policy: Option<RetryPolicy>,
    pub cron_schedule: Option<String>,
    pub header: Option<Header>,
    pub memo: Option<Memo>,
    pub search_attributes: Option<SearchAttributes>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestCancelExternalWorkflowExecutionDecisionAttributes {
    /// Target domain; empty means the workflow's own domain
    pub domain: Option<String>,
    pub workflow_id: String,
    pub run_id: Option<String>,
    pub control: Option<Vec<u8>>,
    pub child_workflow_only: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalExternalWorkflowExecutionDecisionAttributes {
    /// Target domain; empty means the workflow's own domain
    pub domain: Option<String>,
    pub execution: Option<WorkflowExecution>,
    pub signal_name: String,
    pub input: Option<Vec<u8>>,
    pub control: Option<Vec<u8>>,
    pub child_workflow_only: bool,
}
