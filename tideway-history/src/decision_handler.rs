//! Decision-batch processing.
//!
//! The handler applies a decider's decisions, in order, to the run's mutable
//! state. Each decision kind has its own clause: validate the attributes,
//! guard payload sizes, apply the event, and record the implied transfer and
//! timer tasks. Processing stops at the first fail-decision, oversize
//! payload, or non-BadRequest error. The handler performs only in-memory
//! work; the caller commits the outcome in one persistence transaction.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use tideway_shared::error::{is_bad_request, ServiceError, ServiceResult};
use tideway_shared::{
    CancelTimerDecisionAttributes, CancelWorkflowExecutionDecisionAttributes,
    CompleteWorkflowExecutionDecisionAttributes,
    ContinueAsNewWorkflowExecutionDecisionAttributes, Decision, DecisionTaskFailedCause,
    DecisionType, EventAttributes, FailWorkflowExecutionDecisionAttributes,
    RecordMarkerDecisionAttributes, RequestCancelActivityTaskDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes,
    WorkflowExecutionStartedEventAttributes, ContinueAsNewInitiator, EMPTY_EVENT_ID,
};

use crate::attr_validator::DecisionAttrValidator;
use crate::domain::{DomainCache, DomainCacheEntry};
use crate::metrics::{DecisionCounter, MetricsClient};
use crate::mutable_state::MutableState;
use crate::recurrence::continue_as_new_attributes;
use crate::size_checker::BlobSizeChecker;
use crate::tasks::{TimerTask, TransferTask};
use crate::timer_builder::TimerBuilder;

const ACTIVITY_CANCELLATION_MSG_ACTIVITY_ID_UNKNOWN: &str = "ACTIVITY_ID_UNKNOWN";
const ACTIVITY_CANCELLATION_MSG_ACTIVITY_NOT_STARTED: &str = "ACTIVITY_ID_NOT_STARTED";

/// Outcome of one decision batch, handed back to the caller for commit.
pub enum DecisionVerdict {
    /// The batch applied cleanly: commit the mutated state together with the
    /// accumulated tasks. `activity_not_started_cancelled` asks the caller
    /// to schedule a fresh decision task so the workflow observes the
    /// synchronous cancellation.
    Committed {
        transfer_tasks: Vec<TransferTask>,
        timer_tasks: Vec<TimerTask>,
        activity_not_started_cancelled: bool,
    },
    /// The decision task fails; the caller appends the decision-task-failed
    /// event with this cause and schedules a new decision task. No tasks
    /// accompany a failed decision.
    FailDecision {
        cause: DecisionTaskFailedCause,
        message: String,
    },
    /// The current run completed by continuing as new; `new_state` is the
    /// builder for the next run.
    ContinueAsNew {
        new_state: Box<dyn MutableState>,
        transfer_tasks: Vec<TransferTask>,
        timer_tasks: Vec<TimerTask>,
    },
}

pub struct DecisionTaskHandler<'a> {
    identity: String,
    decision_task_completed_id: i64,
    domain_entry: Arc<DomainCacheEntry>,

    // internal state
    has_unhandled_events_before_decisions: bool,
    timer_builder: TimerBuilder,
    transfer_tasks: Vec<TransferTask>,
    timer_tasks: Vec<TimerTask>,
    fail_decision: bool,
    fail_decision_cause: Option<DecisionTaskFailedCause>,
    fail_message: Option<String>,
    activity_not_started_cancelled: bool,
    continue_as_new_builder: Option<Box<dyn MutableState>>,
    stop_processing: bool,
    mutable_state: &'a mut dyn MutableState,

    // validation
    attr_validator: DecisionAttrValidator,
    size_limit_checker: BlobSizeChecker,

    domain_cache: Arc<dyn DomainCache>,
    metrics: Arc<MetricsClient>,
}

impl<'a> DecisionTaskHandler<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: impl Into<String>,
        decision_task_completed_id: i64,
        domain_entry: Arc<DomainCacheEntry>,
        mutable_state: &'a mut dyn MutableState,
        attr_validator: DecisionAttrValidator,
        size_limit_checker: BlobSizeChecker,
        domain_cache: Arc<dyn DomainCache>,
        metrics: Arc<MetricsClient>,
    ) -> Self {
        let has_unhandled_events_before_decisions = mutable_state.has_buffered_events();
        let mut timer_builder = TimerBuilder::new();
        timer_builder.load_user_timers(mutable_state);

        Self {
            identity: identity.into(),
            decision_task_completed_id,
            domain_entry,

            has_unhandled_events_before_decisions,
            timer_builder,
            transfer_tasks: Vec::new(),
            timer_tasks: Vec::new(),
            fail_decision: false,
            fail_decision_cause: None,
            fail_message: None,
            activity_not_started_cancelled: false,
            continue_as_new_builder: None,
            stop_processing: false,
            mutable_state,

            attr_validator,
            size_limit_checker,

            domain_cache,
            metrics,
        }
    }

    /// Apply the batch in order. A non-BadRequest error aborts the batch
    /// and the caller must discard the mutable state.
    pub fn handle_decisions(&mut self, decisions: &[Decision]) -> ServiceResult<()> {
        for decision in decisions {
            self.handle_decision(decision)?;
            if self.stop_processing {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Consume the handler and produce the verdict for the caller.
    pub fn into_verdict(mut self) -> DecisionVerdict {
        if self.fail_decision {
            return DecisionVerdict::FailDecision {
                cause: self
                    .fail_decision_cause
                    .unwrap_or(DecisionTaskFailedCause::UnhandledDecision),
                message: self.fail_message.unwrap_or_default(),
            };
        }

        if let Some(task) = self.timer_builder.first_timer_task() {
            self.timer_tasks.push(task);
        }
        if let Some(task) = self.timer_builder.first_activity_timer_task() {
            self.timer_tasks.push(task);
        }

        if let Some(new_state) = self.continue_as_new_builder {
            return DecisionVerdict::ContinueAsNew {
                new_state,
                transfer_tasks: self.transfer_tasks,
                timer_tasks: self.timer_tasks,
            };
        }
        DecisionVerdict::Committed {
            transfer_tasks: self.transfer_tasks,
            timer_tasks: self.timer_tasks,
            activity_not_started_cancelled: self.activity_not_started_cancelled,
        }
    }

    fn handle_decision(&mut self, decision: &Decision) -> ServiceResult<()> {
        debug!(decision_type = ?decision.decision_type(), "Processing decision");
        match decision {
            Decision::ScheduleActivityTask(attr) => self.handle_decision_schedule_activity(attr),
            Decision::RequestCancelActivityTask(attr) => {
                self.handle_decision_request_cancel_activity(attr)
            }
            Decision::StartTimer(attr) => self.handle_decision_start_timer(attr),
            Decision::CancelTimer(attr) => self.handle_decision_cancel_timer(attr),
            Decision::CompleteWorkflowExecution(attr) => {
                self.handle_decision_complete_workflow(attr)
            }
            Decision::FailWorkflowExecution(attr) => self.handle_decision_fail_workflow(attr),
            Decision::CancelWorkflowExecution(attr) => self.handle_decision_cancel_workflow(attr),
            Decision::RecordMarker(attr) => self.handle_decision_record_marker(attr),
            Decision::ContinueAsNewWorkflowExecution(attr) => {
                self.handle_decision_continue_as_new_workflow(attr)
            }
            Decision::StartChildWorkflowExecution(attr) => {
                self.handle_decision_start_child_workflow(attr)
            }
            Decision::RequestCancelExternalWorkflowExecution(attr) => {
                self.handle_decision_request_cancel_external_workflow(attr)
            }
            Decision::SignalExternalWorkflowExecution(attr) => {
                self.handle_decision_signal_external_workflow(attr)
            }
        }
    }

    fn handle_decision_schedule_activity(
        &mut self,
        attr: &ScheduleActivityTaskDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::ScheduleActivity);

        let domain_id = self.mutable_state.execution_info().domain_id.clone();
        let target_domain_id = match attr.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => {
                let entry = self.domain_cache.get_domain(domain).map_err(|_| {
                    ServiceError::internal_service(format!(
                        "Unable to schedule activity across domain {domain}."
                    ))
                })?;
                entry.info().id.clone()
            }
            None => domain_id.clone(),
        };

        let mut attr = attr.clone();
        let result = self.attr_validator.validate_activity_schedule_attributes(
            &domain_id,
            &target_domain_id,
            &mut attr,
        );
        self.validate_decision_attr(result, DecisionTaskFailedCause::BadScheduleActivityAttributes)?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.input.as_deref(),
            "ScheduleActivityTaskDecisionAttributes.Input exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        match self
            .mutable_state
            .add_activity_task_scheduled_event(self.decision_task_completed_id, &attr)
        {
            Ok((schedule_event, activity_info)) => {
                self.transfer_tasks.push(TransferTask::ActivityTask {
                    target_domain_id,
                    task_list: attr
                        .task_list
                        .as_ref()
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                    schedule_id: schedule_event.event_id,
                });
                self.timer_builder.add_scheduled_activity(activity_info);
                Ok(())
            }
            Err(err) if is_bad_request(&err) => self.handler_fail_decision(
                DecisionTaskFailedCause::ScheduleActivityDuplicateId,
                String::new(),
            ),
            Err(err) => Err(err),
        }
    }

    fn handle_decision_request_cancel_activity(
        &mut self,
        attr: &RequestCancelActivityTaskDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::CancelActivity);

        let result = self.attr_validator.validate_activity_cancel_attributes(attr);
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadRequestCancelActivityAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        let identity = self.identity.clone();
        match self.mutable_state.add_activity_task_cancel_requested_event(
            self.decision_task_completed_id,
            &attr.activity_id,
            &identity,
        ) {
            Ok((cancel_request_event, activity_info)) => {
                if activity_info.started_id == EMPTY_EVENT_ID {
                    // The activity has not started; cancel it right away and
                    // have the caller schedule a decision task so the
                    // workflow makes progress.
                    self.mutable_state.add_activity_task_canceled_event(
                        activity_info.schedule_id,
                        activity_info.started_id,
                        cancel_request_event.event_id,
                        ACTIVITY_CANCELLATION_MSG_ACTIVITY_NOT_STARTED.as_bytes(),
                        &identity,
                    )?;
                    self.activity_not_started_cancelled = true;
                }
                Ok(())
            }
            Err(err) if is_bad_request(&err) => {
                self.mutable_state
                    .add_request_cancel_activity_task_failed_event(
                        self.decision_task_completed_id,
                        &attr.activity_id,
                        ACTIVITY_CANCELLATION_MSG_ACTIVITY_ID_UNKNOWN,
                    )?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn handle_decision_start_timer(
        &mut self,
        attr: &StartTimerDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::StartTimer);

        let result = self.attr_validator.validate_timer_schedule_attributes(attr);
        self.validate_decision_attr(result, DecisionTaskFailedCause::BadStartTimerAttributes)?;
        if self.stop_processing {
            return Ok(());
        }

        match self
            .mutable_state
            .add_timer_started_event(self.decision_task_completed_id, attr)
        {
            Ok((_, timer_info)) => {
                self.timer_builder.add_user_timer(timer_info);
                Ok(())
            }
            Err(err) if is_bad_request(&err) => self.handler_fail_decision(
                DecisionTaskFailedCause::StartTimerDuplicateId,
                String::new(),
            ),
            Err(err) => Err(err),
        }
    }

    fn handle_decision_cancel_timer(
        &mut self,
        attr: &CancelTimerDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::CancelTimer);

        let result = self.attr_validator.validate_timer_cancel_attributes(attr);
        self.validate_decision_attr(result, DecisionTaskFailedCause::BadCancelTimerAttributes)?;
        if self.stop_processing {
            return Ok(());
        }

        let identity = self.identity.clone();
        match self.mutable_state.add_timer_canceled_event(
            self.decision_task_completed_id,
            attr,
            &identity,
        ) {
            Ok(_) => {
                // The deletion invalidated the cached timer projection;
                // rebuild it from the authoritative state.
                self.timer_builder = TimerBuilder::new();
                self.timer_builder.load_user_timers(&*self.mutable_state);

                // The canceled timer may already have fired into the buffer,
                // in which case its fire event was consumed with it.
                // TODO deletion of a fired timer refreshing this flag is not
                //  entirely correct: new events may buffer while the batch
                //  is still being processed.
                self.has_unhandled_events_before_decisions =
                    self.mutable_state.has_buffered_events();
                Ok(())
            }
            Err(err) if is_bad_request(&err) => {
                self.mutable_state.add_cancel_timer_failed_event(
                    self.decision_task_completed_id,
                    attr,
                    &identity,
                )?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn handle_decision_complete_workflow(
        &mut self,
        attr: &CompleteWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::CompleteWorkflow);

        if self.has_unhandled_events_before_decisions {
            return self
                .handler_fail_decision(DecisionTaskFailedCause::UnhandledDecision, String::new());
        }

        let result = self
            .attr_validator
            .validate_complete_workflow_execution_attributes(attr);
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadCompleteWorkflowExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.result.as_deref(),
            "CompleteWorkflowExecutionDecisionAttributes.Result exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        // only the first completion decision in a batch wins
        if !self.mutable_state.is_workflow_execution_running() {
            self.metrics.inc(DecisionCounter::MultipleCompletionDecisions);
            warn!(
                decision_type = ?DecisionType::CompleteWorkflowExecution,
                "Multiple completion decisions"
            );
            return Ok(());
        }

        let Some(cron_backoff) = self.mutable_state.cron_backoff_duration() else {
            // not cron, so complete this workflow execution
            self.mutable_state
                .add_completed_workflow_event(self.decision_task_completed_id, attr)
                .map_err(|_| {
                    ServiceError::internal_service("Unable to add complete workflow event.")
                })?;
            return Ok(());
        };

        let start_attributes = self.start_event_attributes()?;
        self.retry_cron_continue_as_new(
            &start_attributes,
            cron_backoff.as_secs() as i32,
            ContinueAsNewInitiator::CronSchedule,
            None,
            None,
            attr.result.clone(),
        )
    }

    fn handle_decision_fail_workflow(
        &mut self,
        attr: &FailWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::FailWorkflow);

        if self.has_unhandled_events_before_decisions {
            return self
                .handler_fail_decision(DecisionTaskFailedCause::UnhandledDecision, String::new());
        }

        let result = self
            .attr_validator
            .validate_fail_workflow_execution_attributes(attr);
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadFailWorkflowExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.details.as_deref(),
            "FailWorkflowExecutionDecisionAttributes.Details exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        // only the first completion decision in a batch wins
        if !self.mutable_state.is_workflow_execution_running() {
            self.metrics.inc(DecisionCounter::MultipleCompletionDecisions);
            warn!(
                decision_type = ?DecisionType::FailWorkflowExecution,
                "Multiple completion decisions"
            );
            return Ok(());
        }

        // retry backoff wins over the cron schedule
        let reason = attr.reason.clone().unwrap_or_default();
        let mut backoff_interval = self.mutable_state.retry_backoff_duration(&reason);
        let mut continue_as_new_initiator = ContinueAsNewInitiator::RetryPolicy;
        if backoff_interval.is_none() {
            backoff_interval = self.mutable_state.cron_backoff_duration();
            continue_as_new_initiator = ContinueAsNewInitiator::CronSchedule;
        }

        let Some(backoff_interval) = backoff_interval else {
            // no retry or cron
            self.mutable_state
                .add_fail_workflow_event(self.decision_task_completed_id, attr)
                .map_err(|_| {
                    ServiceError::internal_service("Unable to add fail workflow event.")
                })?;
            return Ok(());
        };

        let start_attributes = self.start_event_attributes()?;
        let last_completion_result = start_attributes.last_completion_result.clone();
        self.retry_cron_continue_as_new(
            &start_attributes,
            backoff_interval.as_secs() as i32,
            continue_as_new_initiator,
            attr.reason.clone(),
            attr.details.clone(),
            last_completion_result,
        )
    }

    fn handle_decision_cancel_workflow(
        &mut self,
        attr: &CancelWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::CancelWorkflow);

        if self.has_unhandled_events_before_decisions {
            return self
                .handler_fail_decision(DecisionTaskFailedCause::UnhandledDecision, String::new());
        }

        let result = self
            .attr_validator
            .validate_cancel_workflow_execution_attributes(attr);
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadCancelWorkflowExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        // only the first completion decision in a batch wins
        if !self.mutable_state.is_workflow_execution_running() {
            self.metrics.inc(DecisionCounter::MultipleCompletionDecisions);
            warn!(
                decision_type = ?DecisionType::CancelWorkflowExecution,
                "Multiple completion decisions"
            );
            return Ok(());
        }

        self.mutable_state
            .add_workflow_execution_canceled_event(self.decision_task_completed_id, attr)?;
        Ok(())
    }

    fn handle_decision_record_marker(
        &mut self,
        attr: &RecordMarkerDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::RecordMarker);

        let result = self.attr_validator.validate_record_marker_attributes(attr);
        self.validate_decision_attr(result, DecisionTaskFailedCause::BadRecordMarkerAttributes)?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.details.as_deref(),
            "RecordMarkerDecisionAttributes.Details exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        self.mutable_state
            .add_record_marker_event(self.decision_task_completed_id, attr)?;
        Ok(())
    }

    fn handle_decision_continue_as_new_workflow(
        &mut self,
        attr: &ContinueAsNewWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::ContinueAsNew);

        if self.has_unhandled_events_before_decisions {
            return self
                .handler_fail_decision(DecisionTaskFailedCause::UnhandledDecision, String::new());
        }

        let mut attr = attr.clone();
        let result = self
            .attr_validator
            .validate_continue_as_new_workflow_execution_attributes(
                &self.domain_entry.info().name,
                &mut attr,
                self.mutable_state.execution_info(),
            );
        self.validate_decision_attr(result, DecisionTaskFailedCause::BadContinueAsNewAttributes)?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.input.as_deref(),
            "ContinueAsNewWorkflowExecutionDecisionAttributes.Input exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        // only the first completion decision in a batch wins
        if !self.mutable_state.is_workflow_execution_running() {
            self.metrics.inc(DecisionCounter::MultipleCompletionDecisions);
            warn!(
                decision_type = ?DecisionType::ContinueAsNewWorkflowExecution,
                "Multiple completion decisions"
            );
            return Ok(());
        }

        // the parent domain name travels to the next run
        let parent_domain_name = if self.mutable_state.has_parent_execution() {
            let parent_domain_id = self
                .mutable_state
                .execution_info()
                .parent_domain_id
                .clone()
                .unwrap_or_default();
            let parent_entry = self.domain_cache.get_domain_by_id(&parent_domain_id)?;
            Some(parent_entry.info().name.clone())
        } else {
            None
        };

        let (_, new_state_builder) = self.mutable_state.add_continue_as_new_event(
            self.decision_task_completed_id,
            &self.domain_entry,
            parent_domain_name.as_deref(),
            &attr,
        )?;
        self.continue_as_new_builder = Some(new_state_builder);
        Ok(())
    }

    fn handle_decision_start_child_workflow(
        &mut self,
        attr: &StartChildWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::StartChildWorkflow);

        let domain_id = self.mutable_state.execution_info().domain_id.clone();
        let target_domain_id = match attr.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => {
                let entry = self.domain_cache.get_domain(domain).map_err(|_| {
                    ServiceError::internal_service(format!(
                        "Unable to schedule child execution across domain {domain}."
                    ))
                })?;
                entry.info().id.clone()
            }
            None => domain_id.clone(),
        };

        let mut attr = attr.clone();
        let result = self.attr_validator.validate_start_child_execution_attributes(
            &domain_id,
            &target_domain_id,
            &mut attr,
            self.mutable_state.execution_info(),
        );
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadStartChildExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.input.as_deref(),
            "StartChildWorkflowExecutionDecisionAttributes.Input exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        let create_request_id = Uuid::new_v4().to_string();
        let (initiated_event, _) = self
            .mutable_state
            .add_start_child_workflow_execution_initiated_event(
                self.decision_task_completed_id,
                &create_request_id,
                &attr,
            )?;
        self.transfer_tasks.push(TransferTask::StartChildExecution {
            target_domain_id,
            target_workflow_id: attr.workflow_id.clone(),
            initiated_id: initiated_event.event_id,
        });
        Ok(())
    }

    fn handle_decision_request_cancel_external_workflow(
        &mut self,
        attr: &RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::CancelExternalWorkflow);

        let domain_id = self.mutable_state.execution_info().domain_id.clone();
        let target_domain_id = match attr.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => {
                let entry = self.domain_cache.get_domain(domain).map_err(|_| {
                    ServiceError::internal_service(format!(
                        "Unable to cancel workflow across domain: {domain}."
                    ))
                })?;
                entry.info().id.clone()
            }
            None => domain_id.clone(),
        };

        let result = self
            .attr_validator
            .validate_cancel_external_workflow_execution_attributes(
                &domain_id,
                &target_domain_id,
                attr,
            );
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadRequestCancelExternalWorkflowExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        let cancel_request_id = Uuid::new_v4().to_string();
        let (cancel_request_event, _) = self
            .mutable_state
            .add_request_cancel_external_workflow_execution_initiated_event(
                self.decision_task_completed_id,
                &cancel_request_id,
                attr,
            )
            .map_err(|_| {
                ServiceError::internal_service("Unable to add external cancel workflow request.")
            })?;

        self.transfer_tasks.push(TransferTask::CancelExecution {
            target_domain_id,
            target_workflow_id: attr.workflow_id.clone(),
            target_run_id: attr.run_id.clone(),
            target_child_workflow_only: attr.child_workflow_only,
            initiated_id: cancel_request_event.event_id,
        });
        Ok(())
    }

    fn handle_decision_signal_external_workflow(
        &mut self,
        attr: &SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::SignalExternalWorkflow);

        let domain_id = self.mutable_state.execution_info().domain_id.clone();
        let target_domain_id = match attr.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => {
                let entry = self.domain_cache.get_domain(domain).map_err(|_| {
                    ServiceError::internal_service(format!(
                        "Unable to signal workflow across domain: {domain}."
                    ))
                })?;
                entry.info().id.clone()
            }
            None => domain_id.clone(),
        };

        let result = self
            .attr_validator
            .validate_signal_external_workflow_execution_attributes(
                &domain_id,
                &target_domain_id,
                attr,
            );
        self.validate_decision_attr(
            result,
            DecisionTaskFailedCause::BadSignalWorkflowExecutionAttributes,
        )?;
        if self.stop_processing {
            return Ok(());
        }

        self.check_blob_size(
            attr.input.as_deref(),
            "SignalExternalWorkflowExecutionDecisionAttributes.Input exceeds size limit.",
        )?;
        if self.stop_processing {
            return Ok(());
        }

        // fresh id so the receiver can deduplicate the signal
        let signal_request_id = Uuid::new_v4().to_string();
        let (signal_request_event, _) = self
            .mutable_state
            .add_signal_external_workflow_execution_initiated_event(
                self.decision_task_completed_id,
                &signal_request_id,
                attr,
            )
            .map_err(|_| {
                ServiceError::internal_service("Unable to add external signal workflow request.")
            })?;

        let execution = attr.execution.clone().unwrap_or_else(|| {
            tideway_shared::WorkflowExecution::new(String::new(), String::new())
        });
        self.transfer_tasks.push(TransferTask::SignalExecution {
            target_domain_id,
            target_workflow_id: execution.workflow_id,
            target_run_id: if execution.run_id.is_empty() {
                None
            } else {
                Some(execution.run_id)
            },
            target_child_workflow_only: attr.child_workflow_only,
            initiated_id: signal_request_event.event_id,
        });
        Ok(())
    }

    fn retry_cron_continue_as_new(
        &mut self,
        start_attributes: &WorkflowExecutionStartedEventAttributes,
        backoff_seconds: i32,
        initiator: ContinueAsNewInitiator,
        failure_reason: Option<String>,
        failure_details: Option<Vec<u8>>,
        last_completion_result: Option<Vec<u8>>,
    ) -> ServiceResult<()> {
        let continue_as_new_attr = continue_as_new_attributes(
            start_attributes,
            backoff_seconds,
            initiator,
            failure_reason,
            failure_details,
            last_completion_result,
        );

        let (_, new_state_builder) = self.mutable_state.add_continue_as_new_event(
            self.decision_task_completed_id,
            &self.domain_entry,
            start_attributes.parent_workflow_domain.as_deref(),
            &continue_as_new_attr,
        )?;
        self.continue_as_new_builder = Some(new_state_builder);
        Ok(())
    }

    fn start_event_attributes(&self) -> ServiceResult<WorkflowExecutionStartedEventAttributes> {
        let start_event = self
            .mutable_state
            .start_event()
            .ok_or_else(|| ServiceError::internal_service("Failed to load start event."))?;
        match start_event.attributes {
            Some(EventAttributes::WorkflowExecutionStartedEventAttributes(attr)) => Ok(*attr),
            _ => Err(ServiceError::internal_service(
                "Start event attributes are missing.",
            )),
        }
    }

    fn check_blob_size(&mut self, blob: Option<&[u8]>, message: &str) -> ServiceResult<()> {
        let fail_workflow = match self.size_limit_checker.fail_workflow_if_blob_size_exceeds_limit(
            &mut *self.mutable_state,
            blob,
            message,
        ) {
            Ok(fail_workflow) => fail_workflow,
            Err(err) => {
                self.stop_processing = true;
                return Err(err);
            }
        };
        if fail_workflow {
            self.stop_processing = true;
        }
        Ok(())
    }

    fn validate_decision_attr(
        &mut self,
        result: ServiceResult<()>,
        failed_cause: DecisionTaskFailedCause,
    ) -> ServiceResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if is_bad_request(&err) => {
                self.handler_fail_decision(failed_cause, err.message().to_string())
            }
            Err(err) => Err(err),
        }
    }

    fn handler_fail_decision(
        &mut self,
        failed_cause: DecisionTaskFailedCause,
        fail_message: String,
    ) -> ServiceResult<()> {
        self.metrics.inc(DecisionCounter::FailedDecisions);
        self.fail_decision = true;
        self.fail_decision_cause = Some(failed_cause);
        self.fail_message = Some(fail_message);
        self.stop_processing = true;
        Ok(())
    }
}
