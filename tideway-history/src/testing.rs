//! In-memory mutable state for tests and single-node experiments.
//!
//! [`InMemoryMutableState`] implements the full [`MutableState`] contract
//! over plain maps, with strict event-id monotonicity and a buffered-event
//! queue that can be primed to simulate events arriving while a decision
//! task is in flight.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use tideway_shared::error::{ServiceError, ServiceResult};
use tideway_shared::{
    ActivityTaskCancelRequestedEventAttributes, ActivityTaskCanceledEventAttributes,
    ActivityTaskScheduledEventAttributes, CancelTimerDecisionAttributes,
    CancelTimerFailedEventAttributes, CancelWorkflowExecutionDecisionAttributes,
    CompleteWorkflowExecutionDecisionAttributes, ContinueAsNewInitiator,
    ContinueAsNewWorkflowExecutionDecisionAttributes, DecisionTaskScheduledEventAttributes,
    DecisionTaskStartedEventAttributes, EventAttributes, EventType,
    FailWorkflowExecutionDecisionAttributes, HistoryEvent, MarkerRecordedEventAttributes,
    RecordMarkerDecisionAttributes, RequestCancelActivityTaskFailedEventAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes,
    RequestCancelExternalWorkflowExecutionInitiatedEventAttributes, RetryPolicy,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    SignalExternalWorkflowExecutionInitiatedEventAttributes,
    StartChildWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionInitiatedEventAttributes, StartTimerDecisionAttributes, TaskList,
    TimerCanceledEventAttributes, TimerFiredEventAttributes, TimerStartedEventAttributes,
    WorkflowExecution, WorkflowExecutionCanceledEventAttributes,
    WorkflowExecutionCompletedEventAttributes, WorkflowExecutionContinuedAsNewEventAttributes,
    WorkflowExecutionFailedEventAttributes, WorkflowExecutionSignaledEventAttributes,
    WorkflowExecutionStartedEventAttributes, WorkflowExecutionTerminatedEventAttributes,
    WorkflowType, EMPTY_EVENT_ID, EMPTY_TASK_ID, FIRST_EVENT_ID,
};

use crate::backoff::retry_backoff_interval;
use crate::domain::DomainCacheEntry;
use crate::execution::{
    ActivityInfo, ChildExecutionInfo, RequestCancelInfo, SignalInfo, TimerInfo,
    WorkflowExecutionInfo, WorkflowState,
};
use crate::mutable_state::MutableState;

/// Execution info of a freshly started workflow, shared by test fixtures.
pub fn started_execution_info(
    domain_id: &str,
    workflow_id: &str,
    run_id: &str,
) -> WorkflowExecutionInfo {
    WorkflowExecutionInfo {
        domain_id: domain_id.to_string(),
        workflow_id: workflow_id.to_string(),
        run_id: run_id.to_string(),
        parent_domain_id: None,
        parent_workflow_id: None,
        parent_run_id: None,
        initiated_id: EMPTY_EVENT_ID,
        task_list: "tl".to_string(),
        workflow_type_name: "OrderWorkflow".to_string(),
        workflow_timeout_seconds: 300,
        decision_start_to_close_timeout_seconds: 30,
        next_event_id: FIRST_EVENT_ID,
        state: WorkflowState::Running,
        attempt: 0,
        cron_schedule: None,
        retry_policy: None,
        expiration_time: None,
        last_completion_result: None,
    }
}

pub struct InMemoryMutableState {
    info: WorkflowExecutionInfo,
    history: Vec<HistoryEvent>,
    activities: HashMap<i64, ActivityInfo>,
    activity_ids: HashMap<String, i64>,
    timers: HashMap<String, TimerInfo>,
    child_executions: HashMap<i64, ChildExecutionInfo>,
    request_cancels: HashMap<i64, RequestCancelInfo>,
    signals: HashMap<i64, SignalInfo>,
    buffered_events: Vec<HistoryEvent>,
    cron_backoff: Option<Duration>,
    failover_version: i64,
}

impl InMemoryMutableState {
    /// A running workflow with the start event and one started decision
    /// task already in history; `next_event_id` points past them.
    pub fn started(domain_id: &str, workflow_id: &str, run_id: &str) -> Self {
        let mut state = Self {
            info: started_execution_info(domain_id, workflow_id, run_id),
            history: Vec::new(),
            activities: HashMap::new(),
            activity_ids: HashMap::new(),
            timers: HashMap::new(),
            child_executions: HashMap::new(),
            request_cancels: HashMap::new(),
            signals: HashMap::new(),
            buffered_events: Vec::new(),
            cron_backoff: None,
            failover_version: 0,
        };

        let start_attr = WorkflowExecutionStartedEventAttributes {
            workflow_type: Some(WorkflowType::new(state.info.workflow_type_name.clone())),
            parent_workflow_domain: None,
            parent_workflow_execution: None,
            parent_initiated_event_id: None,
            task_list: Some(TaskList::new(state.info.task_list.clone())),
            input: Some(b"start-input".to_vec()),
            execution_start_to_close_timeout_seconds: state.info.workflow_timeout_seconds,
            task_start_to_close_timeout_seconds: state
                .info
                .decision_start_to_close_timeout_seconds,
            identity: "starter".to_string(),
            continued_execution_run_id: None,
            initiator: None,
            continued_failure_reason: None,
            continued_failure_details: None,
            last_completion_result: None,
            original_execution_run_id: Some(run_id.to_string()),
            first_execution_run_id: Some(run_id.to_string()),
            retry_policy: None,
            attempt: 0,
            expiration_timestamp: None,
            cron_schedule: None,
            first_decision_task_backoff_seconds: 0,
        };
        state.append_event(
            EventType::WorkflowExecutionStarted,
            EventAttributes::WorkflowExecutionStartedEventAttributes(Box::new(start_attr)),
        );
        state.append_event(
            EventType::DecisionTaskScheduled,
            EventAttributes::DecisionTaskScheduledEventAttributes(Box::new(
                DecisionTaskScheduledEventAttributes {
                    task_list: Some(TaskList::new(state.info.task_list.clone())),
                    start_to_close_timeout_seconds: state
                        .info
                        .decision_start_to_close_timeout_seconds,
                    attempt: 0,
                },
            )),
        );
        state.append_event(
            EventType::DecisionTaskStarted,
            EventAttributes::DecisionTaskStartedEventAttributes(Box::new(
                DecisionTaskStartedEventAttributes {
                    scheduled_event_id: 2,
                    identity: "worker@test".to_string(),
                    request_id: Uuid::new_v4().to_string(),
                },
            )),
        );
        state
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy, attempt: i32) -> Self {
        self.info.retry_policy = Some(policy.clone());
        self.info.attempt = attempt;
        if let Some(HistoryEvent {
            attributes:
                Some(EventAttributes::WorkflowExecutionStartedEventAttributes(start_attr)),
            ..
        }) = self.history.first_mut()
        {
            start_attr.retry_policy = Some(policy);
            start_attr.attempt = attempt;
        }
        self
    }

    pub fn with_cron_backoff(mut self, backoff: Duration, schedule: &str) -> Self {
        self.cron_backoff = Some(backoff);
        self.info.cron_schedule = Some(schedule.to_string());
        if let Some(HistoryEvent {
            attributes:
                Some(EventAttributes::WorkflowExecutionStartedEventAttributes(start_attr)),
            ..
        }) = self.history.first_mut()
        {
            start_attr.cron_schedule = Some(schedule.to_string());
        }
        self
    }

    pub fn with_parent(mut self, parent_domain_id: &str, parent_workflow_id: &str) -> Self {
        self.info.parent_domain_id = Some(parent_domain_id.to_string());
        self.info.parent_workflow_id = Some(parent_workflow_id.to_string());
        self.info.parent_run_id = Some(Uuid::new_v4().to_string());
        self.info.initiated_id = 1;
        self
    }

    pub fn with_last_completion_result(mut self, result: Vec<u8>) -> Self {
        self.info.last_completion_result = Some(result.clone());
        if let Some(HistoryEvent {
            attributes:
                Some(EventAttributes::WorkflowExecutionStartedEventAttributes(start_attr)),
            ..
        }) = self.history.first_mut()
        {
            start_attr.last_completion_result = Some(result);
        }
        self
    }

    /// Queue a signal into the buffer, as if it arrived mid decision task.
    pub fn buffer_signal(&mut self, signal_name: &str) {
        self.buffered_events.push(HistoryEvent {
            event_id: EMPTY_EVENT_ID,
            timestamp: Utc::now(),
            event_type: EventType::WorkflowExecutionSignaled,
            version: self.failover_version,
            task_id: EMPTY_TASK_ID,
            attributes: Some(EventAttributes::WorkflowExecutionSignaledEventAttributes(
                Box::new(WorkflowExecutionSignaledEventAttributes {
                    signal_name: signal_name.to_string(),
                    input: None,
                    identity: "external".to_string(),
                }),
            )),
        });
    }

    /// Queue a timer-fired event for a live timer into the buffer.
    pub fn buffer_timer_fired(&mut self, timer_id: &str) {
        let started_id = self
            .timers
            .get(timer_id)
            .map(|t| t.started_id)
            .unwrap_or(EMPTY_EVENT_ID);
        self.buffered_events.push(HistoryEvent {
            event_id: EMPTY_EVENT_ID,
            timestamp: Utc::now(),
            event_type: EventType::TimerFired,
            version: self.failover_version,
            task_id: EMPTY_TASK_ID,
            attributes: Some(EventAttributes::TimerFiredEventAttributes(Box::new(
                TimerFiredEventAttributes {
                    timer_id: timer_id.to_string(),
                    started_event_id: started_id,
                },
            ))),
        });
    }

    /// Install a live timer without going through a decision.
    pub fn put_timer(&mut self, info: TimerInfo) {
        self.timers.insert(info.timer_id.clone(), info);
    }

    /// Mark a scheduled activity as started by a worker.
    pub fn mark_activity_started(&mut self, schedule_id: i64) {
        let started_id = self.info.next_event_id;
        if let Some(activity) = self.activities.get_mut(&schedule_id) {
            activity.started_id = started_id;
        }
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    pub fn events_of_type(&self, event_type: EventType) -> Vec<&HistoryEvent> {
        self.history
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    fn append_event(&mut self, event_type: EventType, attributes: EventAttributes) -> HistoryEvent {
        let event = HistoryEvent {
            event_id: self.info.next_event_id,
            timestamp: Utc::now(),
            event_type,
            version: self.failover_version,
            task_id: EMPTY_TASK_ID,
            attributes: Some(attributes),
        };
        self.info.next_event_id += 1;
        self.history.push(event.clone());
        event
    }

    fn ensure_running(&self, action: &str) -> ServiceResult<()> {
        if self.info.state != WorkflowState::Running {
            return Err(ServiceError::internal_service(format!(
                "Invalid state for action {action}: workflow is not running.",
            )));
        }
        Ok(())
    }
}

impl MutableState for InMemoryMutableState {
    fn execution_info(&self) -> &WorkflowExecutionInfo {
        &self.info
    }

    fn is_workflow_execution_running(&self) -> bool {
        self.info.state == WorkflowState::Running
    }

    fn has_buffered_events(&self) -> bool {
        !self.buffered_events.is_empty()
    }

    fn has_parent_execution(&self) -> bool {
        self.info.has_parent_execution()
    }

    fn start_event(&self) -> Option<HistoryEvent> {
        self.history
            .iter()
            .find(|e| e.event_type == EventType::WorkflowExecutionStarted)
            .cloned()
    }

    fn cron_backoff_duration(&self) -> Option<Duration> {
        self.cron_backoff
    }

    fn retry_backoff_duration(&self, failure_reason: &str) -> Option<Duration> {
        let policy = self.info.retry_policy.as_ref()?;
        retry_backoff_interval(
            policy,
            self.info.attempt,
            Some(failure_reason),
            Utc::now(),
            self.info.expiration_time,
        )
    }

    fn pending_timer_infos(&self) -> Vec<TimerInfo> {
        self.timers.values().cloned().collect()
    }

    fn pending_activity_infos(&self) -> Vec<ActivityInfo> {
        self.activities.values().cloned().collect()
    }

    fn add_activity_task_scheduled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &ScheduleActivityTaskDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, ActivityInfo)> {
        self.ensure_running("add activity task scheduled event")?;
        if self.activity_ids.contains_key(&attr.activity_id) {
            return Err(ServiceError::bad_request(format!(
                "Duplicate activity ID: {}.",
                attr.activity_id
            )));
        }

        let event = self.append_event(
            EventType::ActivityTaskScheduled,
            EventAttributes::ActivityTaskScheduledEventAttributes(Box::new(
                ActivityTaskScheduledEventAttributes {
                    activity_id: attr.activity_id.clone(),
                    activity_type: attr.activity_type.clone(),
                    domain: attr.domain.clone(),
                    task_list: attr.task_list.clone(),
                    input: attr.input.clone(),
                    schedule_to_close_timeout_seconds: attr.schedule_to_close_timeout_seconds,
                    schedule_to_start_timeout_seconds: attr.schedule_to_start_timeout_seconds,
                    start_to_close_timeout_seconds: attr.start_to_close_timeout_seconds,
                    heartbeat_timeout_seconds: attr.heartbeat_timeout_seconds,
                    decision_task_completed_event_id: decision_task_completed_id,
                    retry_policy: attr.retry_policy.clone(),
                    header: attr.header.clone(),
                },
            )),
        );

        let activity_info = ActivityInfo {
            schedule_id: event.event_id,
            started_id: EMPTY_EVENT_ID,
            activity_id: attr.activity_id.clone(),
            scheduled_time: event.timestamp,
            schedule_to_close_timeout_seconds: attr.schedule_to_close_timeout_seconds.unwrap_or(0),
            schedule_to_start_timeout_seconds: attr.schedule_to_start_timeout_seconds.unwrap_or(0),
            start_to_close_timeout_seconds: attr.start_to_close_timeout_seconds.unwrap_or(0),
            heartbeat_timeout_seconds: attr.heartbeat_timeout_seconds.unwrap_or(0),
            attempt: 0,
            cancel_requested: false,
            cancel_request_id: EMPTY_EVENT_ID,
        };
        self.activities
            .insert(activity_info.schedule_id, activity_info.clone());
        self.activity_ids
            .insert(attr.activity_id.clone(), activity_info.schedule_id);
        Ok((event, activity_info))
    }

    fn add_activity_task_cancel_requested_event(
        &mut self,
        decision_task_completed_id: i64,
        activity_id: &str,
        _identity: &str,
    ) -> ServiceResult<(HistoryEvent, ActivityInfo)> {
        self.ensure_running("add activity task cancel requested event")?;
        let schedule_id = *self.activity_ids.get(activity_id).ok_or_else(|| {
            ServiceError::bad_request(format!("Unknown activity ID: {activity_id}."))
        })?;

        let event = self.append_event(
            EventType::ActivityTaskCancelRequested,
            EventAttributes::ActivityTaskCancelRequestedEventAttributes(Box::new(
                ActivityTaskCancelRequestedEventAttributes {
                    activity_id: activity_id.to_string(),
                    decision_task_completed_event_id: decision_task_completed_id,
                },
            )),
        );

        let event_id = event.event_id;
        let activity = self
            .activities
            .get_mut(&schedule_id)
            .expect("activity row exists for known id");
        activity.cancel_requested = true;
        activity.cancel_request_id = event_id;
        let snapshot = activity.clone();
        Ok((event, snapshot))
    }

    fn add_activity_task_canceled_event(
        &mut self,
        schedule_id: i64,
        started_id: i64,
        latest_cancel_requested_id: i64,
        details: &[u8],
        identity: &str,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add activity task canceled event")?;
        let activity = self.activities.remove(&schedule_id).ok_or_else(|| {
            ServiceError::internal_service(format!(
                "Unknown activity schedule ID: {schedule_id}."
            ))
        })?;
        self.activity_ids.remove(&activity.activity_id);

        Ok(self.append_event(
            EventType::ActivityTaskCanceled,
            EventAttributes::ActivityTaskCanceledEventAttributes(Box::new(
                ActivityTaskCanceledEventAttributes {
                    details: Some(details.to_vec()),
                    latest_cancel_requested_event_id: latest_cancel_requested_id,
                    scheduled_event_id: schedule_id,
                    started_event_id: started_id,
                    identity: identity.to_string(),
                },
            )),
        ))
    }

    fn add_request_cancel_activity_task_failed_event(
        &mut self,
        decision_task_completed_id: i64,
        activity_id: &str,
        cause: &str,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add request cancel activity task failed event")?;
        Ok(self.append_event(
            EventType::RequestCancelActivityTaskFailed,
            EventAttributes::RequestCancelActivityTaskFailedEventAttributes(Box::new(
                RequestCancelActivityTaskFailedEventAttributes {
                    activity_id: activity_id.to_string(),
                    cause: cause.to_string(),
                    decision_task_completed_event_id: decision_task_completed_id,
                },
            )),
        ))
    }

    fn add_timer_started_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &StartTimerDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, TimerInfo)> {
        self.ensure_running("add timer started event")?;
        if self.timers.contains_key(&attr.timer_id) {
            return Err(ServiceError::bad_request(format!(
                "Duplicate timer ID: {}.",
                attr.timer_id
            )));
        }

        let event = self.append_event(
            EventType::TimerStarted,
            EventAttributes::TimerStartedEventAttributes(Box::new(TimerStartedEventAttributes {
                timer_id: attr.timer_id.clone(),
                start_to_fire_timeout_seconds: attr.start_to_fire_timeout_seconds,
                decision_task_completed_event_id: decision_task_completed_id,
            })),
        );

        let timer_info = TimerInfo {
            timer_id: attr.timer_id.clone(),
            started_id: event.event_id,
            expiry_time: event.timestamp
                + chrono::Duration::seconds(attr.start_to_fire_timeout_seconds),
            task_id: EMPTY_TASK_ID,
        };
        self.timers
            .insert(timer_info.timer_id.clone(), timer_info.clone());
        Ok((event, timer_info))
    }

    fn add_timer_canceled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelTimerDecisionAttributes,
        identity: &str,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add timer canceled event")?;
        let timer = self.timers.remove(&attr.timer_id).ok_or_else(|| {
            ServiceError::bad_request(format!("Unknown timer ID: {}.", attr.timer_id))
        })?;

        // a fire event sitting in the buffer is consumed with the timer
        self.buffered_events.retain(|e| {
            !matches!(
                &e.attributes,
                Some(EventAttributes::TimerFiredEventAttributes(fired))
                    if fired.timer_id == attr.timer_id
            )
        });

        Ok(self.append_event(
            EventType::TimerCanceled,
            EventAttributes::TimerCanceledEventAttributes(Box::new(TimerCanceledEventAttributes {
                timer_id: attr.timer_id.clone(),
                started_event_id: timer.started_id,
                decision_task_completed_event_id: decision_task_completed_id,
                identity: identity.to_string(),
            })),
        ))
    }

    fn add_cancel_timer_failed_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelTimerDecisionAttributes,
        identity: &str,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add cancel timer failed event")?;
        Ok(self.append_event(
            EventType::CancelTimerFailed,
            EventAttributes::CancelTimerFailedEventAttributes(Box::new(
                CancelTimerFailedEventAttributes {
                    timer_id: attr.timer_id.clone(),
                    cause: "TIMER_ID_UNKNOWN".to_string(),
                    decision_task_completed_event_id: decision_task_completed_id,
                    identity: identity.to_string(),
                },
            )),
        ))
    }

    fn add_completed_workflow_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CompleteWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add completed workflow event")?;
        let event = self.append_event(
            EventType::WorkflowExecutionCompleted,
            EventAttributes::WorkflowExecutionCompletedEventAttributes(Box::new(
                WorkflowExecutionCompletedEventAttributes {
                    result: attr.result.clone(),
                    decision_task_completed_event_id: decision_task_completed_id,
                },
            )),
        );
        self.info.state = WorkflowState::Completed;
        Ok(event)
    }

    fn add_fail_workflow_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &FailWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add fail workflow event")?;
        let event = self.append_event(
            EventType::WorkflowExecutionFailed,
            EventAttributes::WorkflowExecutionFailedEventAttributes(Box::new(
                WorkflowExecutionFailedEventAttributes {
                    reason: attr.reason.clone(),
                    details: attr.details.clone(),
                    decision_task_completed_event_id: decision_task_completed_id,
                },
            )),
        );
        self.info.state = WorkflowState::Completed;
        Ok(event)
    }

    fn add_workflow_execution_canceled_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &CancelWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add workflow execution canceled event")?;
        let event = self.append_event(
            EventType::WorkflowExecutionCanceled,
            EventAttributes::WorkflowExecutionCanceledEventAttributes(Box::new(
                WorkflowExecutionCanceledEventAttributes {
                    details: attr.details.clone(),
                    decision_task_completed_event_id: decision_task_completed_id,
                },
            )),
        );
        self.info.state = WorkflowState::Completed;
        Ok(event)
    }

    fn add_workflow_execution_terminated_event(
        &mut self,
        reason: &str,
        details: &[u8],
        identity: &str,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add workflow execution terminated event")?;
        let event = self.append_event(
            EventType::WorkflowExecutionTerminated,
            EventAttributes::WorkflowExecutionTerminatedEventAttributes(Box::new(
                WorkflowExecutionTerminatedEventAttributes {
                    reason: reason.to_string(),
                    details: Some(details.to_vec()),
                    identity: identity.to_string(),
                },
            )),
        );
        self.info.state = WorkflowState::Completed;
        Ok(event)
    }

    fn add_record_marker_event(
        &mut self,
        decision_task_completed_id: i64,
        attr: &RecordMarkerDecisionAttributes,
    ) -> ServiceResult<HistoryEvent> {
        self.ensure_running("add record marker event")?;
        Ok(self.append_event(
            EventType::MarkerRecorded,
            EventAttributes::MarkerRecordedEventAttributes(Box::new(
                MarkerRecordedEventAttributes {
                    marker_name: attr.marker_name.clone(),
                    details: attr.details.clone(),
                    decision_task_completed_event_id: decision_task_completed_id,
                    header: attr.header.clone(),
                },
            )),
        ))
    }

    fn add_start_child_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        create_request_id: &str,
        attr: &StartChildWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, ChildExecutionInfo)> {
        self.ensure_running("add start child workflow execution initiated event")?;
        let event = self.append_event(
            EventType::StartChildWorkflowExecutionInitiated,
            EventAttributes::StartChildWorkflowExecutionInitiatedEventAttributes(Box::new(
                StartChildWorkflowExecutionInitiatedEventAttributes {
                    domain: attr.domain.clone(),
                    workflow_id: attr.workflow_id.clone(),
                    workflow_type: attr.workflow_type.clone(),
                    task_list: attr.task_list.clone(),
                    input: attr.input.clone(),
                    execution_start_to_close_timeout_seconds: attr
                        .execution_start_to_close_timeout_seconds,
                    task_start_to_close_timeout_seconds: attr.task_start_to_close_timeout_seconds,
                    parent_close_policy: attr.parent_close_policy,
                    control: attr.control.clone(),
                    decision_task_completed_event_id: decision_task_completed_id,
                    workflow_id_reuse_policy: attr.workflow_id_reuse_policy,
                    retry_policy: attr.retry_policy.clone(),
                    cron_schedule: attr.cron_schedule.clone(),
                },
            )),
        );

        let child_info = ChildExecutionInfo {
            initiated_id: event.event_id,
            started_id: EMPTY_EVENT_ID,
            create_request_id: create_request_id.to_string(),
            workflow_id: attr.workflow_id.clone(),
            workflow_type_name: attr
                .workflow_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_default(),
            domain_id: attr.domain.clone().unwrap_or_else(|| self.info.domain_id.clone()),
        };
        self.child_executions
            .insert(child_info.initiated_id, child_info.clone());
        Ok((event, child_info))
    }

    fn add_request_cancel_external_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        cancel_request_id: &str,
        attr: &RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, RequestCancelInfo)> {
        self.ensure_running("add request cancel external workflow execution initiated event")?;
        let event = self.append_event(
            EventType::RequestCancelExternalWorkflowExecutionInitiated,
            EventAttributes::RequestCancelExternalWorkflowExecutionInitiatedEventAttributes(
                Box::new(RequestCancelExternalWorkflowExecutionInitiatedEventAttributes {
                    decision_task_completed_event_id: decision_task_completed_id,
                    domain: attr.domain.clone(),
                    workflow_execution: Some(WorkflowExecution::new(
                        attr.workflow_id.clone(),
                        attr.run_id.clone().unwrap_or_default(),
                    )),
                    control: attr.control.clone(),
                    child_workflow_only: attr.child_workflow_only,
                }),
            ),
        );

        let cancel_info = RequestCancelInfo {
            initiated_id: event.event_id,
            cancel_request_id: cancel_request_id.to_string(),
        };
        self.request_cancels
            .insert(cancel_info.initiated_id, cancel_info.clone());
        Ok((event, cancel_info))
    }

    fn add_signal_external_workflow_execution_initiated_event(
        &mut self,
        decision_task_completed_id: i64,
        signal_request_id: &str,
        attr: &SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, SignalInfo)> {
        self.ensure_running("add signal external workflow execution initiated event")?;
        let event = self.append_event(
            EventType::SignalExternalWorkflowExecutionInitiated,
            EventAttributes::SignalExternalWorkflowExecutionInitiatedEventAttributes(Box::new(
                SignalExternalWorkflowExecutionInitiatedEventAttributes {
                    decision_task_completed_event_id: decision_task_completed_id,
                    domain: attr.domain.clone(),
                    workflow_execution: attr.execution.clone(),
                    signal_name: attr.signal_name.clone(),
                    input: attr.input.clone(),
                    control: attr.control.clone(),
                    child_workflow_only: attr.child_workflow_only,
                },
            )),
        );

        let signal_info = SignalInfo {
            initiated_id: event.event_id,
            signal_request_id: signal_request_id.to_string(),
            signal_name: attr.signal_name.clone(),
        };
        self.signals.insert(signal_info.initiated_id, signal_info.clone());
        Ok((event, signal_info))
    }

    fn add_continue_as_new_event(
        &mut self,
        decision_task_completed_id: i64,
        domain_entry: &DomainCacheEntry,
        parent_domain_name: Option<&str>,
        attr: &ContinueAsNewWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<(HistoryEvent, Box<dyn MutableState>)> {
        self.ensure_running("add continue as new event")?;
        let new_run_id = Uuid::new_v4().to_string();

        let event = self.append_event(
            EventType::WorkflowExecutionContinuedAsNew,
            EventAttributes::WorkflowExecutionContinuedAsNewEventAttributes(Box::new(
                WorkflowExecutionContinuedAsNewEventAttributes {
                    new_execution_run_id: new_run_id.clone(),
                    workflow_type: attr.workflow_type.clone(),
                    task_list: attr.task_list.clone(),
                    input: attr.input.clone(),
                    execution_start_to_close_timeout_seconds: attr
                        .execution_start_to_close_timeout_seconds
                        .unwrap_or(self.info.workflow_timeout_seconds),
                    task_start_to_close_timeout_seconds: attr
                        .task_start_to_close_timeout_seconds
                        .unwrap_or(self.info.decision_start_to_close_timeout_seconds),
                    decision_task_completed_event_id: decision_task_completed_id,
                    backoff_start_interval_in_seconds: attr
                        .backoff_start_interval_in_seconds
                        .unwrap_or(0),
                    initiator: attr.initiator,
                    failure_reason: attr.failure_reason.clone(),
                    failure_details: attr.failure_details.clone(),
                    last_completion_result: attr.last_completion_result.clone(),
                },
            )),
        );
        self.info.state = WorkflowState::Completed;

        // build the next run's state
        let mut next = InMemoryMutableState::started(
            &domain_entry.info().id,
            &self.info.workflow_id,
            &new_run_id,
        );
        next.info.workflow_type_name = attr
            .workflow_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| self.info.workflow_type_name.clone());
        next.info.task_list = attr
            .task_list
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| self.info.task_list.clone());
        next.info.workflow_timeout_seconds = attr
            .execution_start_to_close_timeout_seconds
            .unwrap_or(self.info.workflow_timeout_seconds);
        next.info.decision_start_to_close_timeout_seconds = attr
            .task_start_to_close_timeout_seconds
            .unwrap_or(self.info.decision_start_to_close_timeout_seconds);
        next.info.retry_policy = attr.retry_policy.clone();
        next.info.cron_schedule = attr.cron_schedule.clone();
        next.info.attempt = match attr.initiator {
            Some(ContinueAsNewInitiator::RetryPolicy) => self.info.attempt + 1,
            _ => 0,
        };
        next.info.last_completion_result = attr.last_completion_result.clone();
        next.info.parent_domain_id = self.info.parent_domain_id.clone();
        next.info.parent_workflow_id = self.info.parent_workflow_id.clone();
        next.info.parent_run_id = self.info.parent_run_id.clone();
        next.info.initiated_id = self.info.initiated_id;

        if let Some(HistoryEvent {
            attributes:
                Some(EventAttributes::WorkflowExecutionStartedEventAttributes(start_attr)),
            ..
        }) = next.history.first_mut()
        {
            start_attr.workflow_type = attr.workflow_type.clone();
            start_attr.task_list = attr.task_list.clone();
            start_attr.input = attr.input.clone();
            start_attr.execution_start_to_close_timeout_seconds =
                next.info.workflow_timeout_seconds;
            start_attr.task_start_to_close_timeout_seconds =
                next.info.decision_start_to_close_timeout_seconds;
            start_attr.parent_workflow_domain = parent_domain_name.map(str::to_string);
            start_attr.continued_execution_run_id = Some(self.info.run_id.clone());
            start_attr.initiator = attr.initiator;
            start_attr.continued_failure_reason = attr.failure_reason.clone();
            start_attr.continued_failure_details = attr.failure_details.clone();
            start_attr.last_completion_result = attr.last_completion_result.clone();
            start_attr.retry_policy = attr.retry_policy.clone();
            start_attr.attempt = next.info.attempt;
            start_attr.cron_schedule = attr.cron_schedule.clone();
            start_attr.first_decision_task_backoff_seconds =
                attr.backoff_start_interval_in_seconds.unwrap_or(0);
        }

        Ok((event, Box::new(next)))
    }
}
