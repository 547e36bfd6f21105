//! Mutable-state contract consumed by the decision-task handler.
//!
//! One implementation backs production (a history-builder over persistence);
//! tests use [`crate::testing::InMemoryMutableState`]. The handler owns the
//! state exclusively for the duration of one batch and performs only
//! in-memory work against it; the caller commits or discards afterwards.

use std::time::Duration;

use tideway_shared::error::ServiceResult;
use tideway_shared::{
    CancelTimerDecisionAttributes, CancelWorkflowExecutionDecisionAttributes,
    CompleteWorkflowExecutionDecisionAttributes,
    ContinueAsNewWorkflowExecutionDecisionAttributes, FailWorkflowExecutionDecisionAttributes,
    HistoryEvent, RecordMarkerDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes,
};

use crate::domain::DomainCacheEntry;
use crate::execution::{
    ActivityInfo, ChildExecutionInfo, RequestCancelInfo, SignalInfo, TimerInfo,
    WorkflowExecutionInfo,
};

/// The in-memory representation of a workflow run between commits.
///
/// Every `add_*` mutator appends exactly one history event with the next
/// monotonic event id and returns it (plus side data where the handler needs
/// it). Errors are classified: `BadRequest` for decider mistakes the handler
/// converts to a fail-decision verdict, `InternalService` for precondition
/// violations that abort the batch.
pub trait MutableState {
    fn execution_info(&self) -> &WorkflowExecutionInfo;

    fn is_workflow_execution_running(&self) -> bool;

    /// Whether external events arrived while the decision task was in
    /// flight; they must be observed by the next decision task.
    fn has_buffered_events(&self) -> bool;

    fn has_parent_execution(&self) -> bool;

    /// The `WorkflowExecutionStarted` event, absent only when state is
    /// corrupt.
    fn start_event(&self) -> Option<HistoryEvent>;

    /// Backoff until the next cron fire, or `None` when the workflow has no
    /// cron schedule.
    fn cron_backoff_duration(&self) -> Option<Duration>;

    /// Backoff until the next retry attempt per the run's retry policy, or
    /// `None` when retries do not apply to this failure.
    fn retry_backoff_duration(&self, failure_reason: &str) -> Option<Duration>;

    /// Live user timers, unordered.
    fn pending_timer_infos(&self) -> Vec<TimerInfo>;

    /// Pending activities, unordered.
    fn pending_activity_infos(&self) -> Vec<ActivityInfo>;

    fn add_activity_task_scheduled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &ScheduleActivityTaskDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, ActivityInfo)>;

    fn add_activity_task_cancel_requested_event(
        &mut self,
        decision_task_completed_id: i64,
        activity_id: &str,
        identity: &str,
    ) -> ServiceResult<(HistoryEvent, ActivityInfo)>;

    fn add_activity_task_canceled_event(
        &mut self,
        schedule_id: i64,
        started_id: i64,
        latest_cancel_requested_id: i64,
        details: &[u8],
        identity: &str,
    ) -> ServiceResult<HistoryEvent>;

    fn add_request_cancel_activity_task_failed_event(
        &mut self,
        decision_task_completed_id: i64,
        activity_id: &str,
        cause: &str,
    ) -> ServiceResult<HistoryEvent>;

    fn add_timer_started_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &StartTimerDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, TimerInfo)>;

    fn add_timer_canceled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelTimerDecisionAttributes,
        identity: &str,
    ) -> ServiceResult<HistoryEvent>;

    fn add_cancel_timer_failed_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelTimerDecisionAttributes,
        identity: &str,
    ) -> ServiceResult<HistoryEvent>;

    fn add_completed_workflow_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CompleteWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent>;

    fn add_fail_workflow_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &FailWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent>;

    fn add_workflow_execution_canceled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent>;

    fn add_workflow_execution_terminated_event(
        &mut self,
        reason: &str,
        details: &[u8],
        identity: &str,
    ) -> ServiceResult<HistoryEvent>;

    fn add_record_marker_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &RecordMarkerDecisionAttributes,
    ) -> ServiceResult<HistoryEvent>;

    fn add_start_child_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        create_request_id: &str,
        attr: &StartChildWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, ChildExecutionInfo)>;

    fn add_request_cancel_external_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        cancel_request_id: &str,
        attr: &RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, RequestCancelInfo)>;

    fn add_signal_external_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        signal_request_id: &str,
        attr: &SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, SignalInfo)>;

    /// Close the current run with `WorkflowExecutionContinuedAsNew` and
    /// return the state builder for the next run.
    fn add_continue_as_new_event(
        &mut self,
        decision_task_completed_id: i64,
        domain_entry: &DomainCacheEntry,
        parent_domain_name: Option<&str>,
        attr: &ContinueAsNewWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, Box<dyn MutableState>)>;
}
