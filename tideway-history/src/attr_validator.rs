//! Per-decision attribute validation.
//!
//! One function per decision kind. Each returns `Ok(())` or a
//! `BadRequest` describing the first violation; the handler converts a
//! `BadRequest` into a fail-decision verdict with the per-kind cause.
//! Non-BadRequest errors (domain lookups) propagate unchanged.
//!
//! Several validators also complete missing fields from the current
//! execution (continue-as-new and child workflows inherit the parent's
//! type, task list, and timeouts when the decider leaves them unset), so
//! they take the attribute record mutably.

use std::sync::Arc;

use tideway_shared::error::{ServiceError, ServiceResult};
use tideway_shared::{
    CancelTimerDecisionAttributes, CancelWorkflowExecutionDecisionAttributes,
    CompleteWorkflowExecutionDecisionAttributes,
    ContinueAsNewWorkflowExecutionDecisionAttributes, FailWorkflowExecutionDecisionAttributes,
    RecordMarkerDecisionAttributes, RequestCancelActivityTaskDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes, RetryPolicy,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes, TaskList,
    WorkflowType,
};

use crate::config::HistoryConfig;
use crate::domain::DomainCache;
use crate::execution::WorkflowExecutionInfo;

pub struct DecisionAttrValidator {
    domain_cache: Arc<dyn DomainCache>,
    config: Arc<HistoryConfig>,
}

impl DecisionAttrValidator {
    pub fn new(domain_cache: Arc<dyn DomainCache>, config: Arc<HistoryConfig>) -> Self {
        Self {
            domain_cache,
            config,
        }
    }

    pub fn validate_activity_schedule_attributes(
        &self,
        domain_id: &str,
        target_domain_id: &str,
        attr: &mut ScheduleActivityTaskDecisionAttributes,
    ) -> ServiceResult<()> {
        self.validate_cross_domain_call(domain_id, target_domain_id)?;

        if attr.activity_id.is_empty() {
            return Err(ServiceError::bad_request("ActivityId is not set on decision."));
        }
        if attr.activity_type.as_ref().map_or(true, |t| t.name.is_empty()) {
            return Err(ServiceError::bad_request("ActivityType is not set on decision."));
        }
        if attr.task_list.as_ref().map_or(true, |t| t.name.is_empty()) {
            return Err(ServiceError::bad_request("TaskList is not set on decision."));
        }

        let schedule_to_close = attr.schedule_to_close_timeout_seconds.unwrap_or(0);
        let schedule_to_start = attr.schedule_to_start_timeout_seconds.unwrap_or(0);
        let start_to_close = attr.start_to_close_timeout_seconds.unwrap_or(0);
        let heartbeat = attr.heartbeat_timeout_seconds.unwrap_or(0);
        if schedule_to_close < 0 || schedule_to_start < 0 || start_to_close < 0 || heartbeat < 0 {
            return Err(ServiceError::bad_request(
                "A valid timeout may not be negative.",
            ));
        }

        let valid_schedule_to_close = schedule_to_close > 0;
        let valid_schedule_to_start = schedule_to_start > 0;
        let valid_start_to_close = start_to_close > 0;

        if valid_schedule_to_close {
            if valid_schedule_to_start && valid_start_to_close {
                if schedule_to_close < schedule_to_start + start_to_close {
                    return Err(ServiceError::bad_request(
                        "ScheduleToCloseTimeout is less than ScheduleToStartTimeout plus StartToCloseTimeout.",
                    ));
                }
            } else {
                // complete the missing legs from the full interval
                if !valid_schedule_to_start {
                    attr.schedule_to_start_timeout_seconds = Some(schedule_to_close);
                }
                if !valid_start_to_close {
                    attr.start_to_close_timeout_seconds = Some(schedule_to_close);
                }
            }
        } else if valid_schedule_to_start && valid_start_to_close {
            attr.schedule_to_close_timeout_seconds = Some(schedule_to_start + start_to_close);
        } else {
            return Err(ServiceError::bad_request(
                "A valid ScheduleToCloseTimeout is not set on decision; neither are both of ScheduleToStartTimeout and StartToCloseTimeout.",
            ));
        }

        validate_retry_policy(attr.retry_policy.as_ref())
    }

    pub fn validate_activity_cancel_attributes(
        &self,
        attr: &RequestCancelActivityTaskDecisionAttributes,
    ) -> ServiceResult<()> {
        if attr.activity_id.is_empty() {
            return Err(ServiceError::bad_request("ActivityId is not set on decision."));
        }
        Ok(())
    }

    pub fn validate_timer_schedule_attributes(
        &self,
        attr: &StartTimerDecisionAttributes,
    ) -> ServiceResult<()> {
        if attr.timer_id.is_empty() {
            return Err(ServiceError::bad_request("TimerId is not set on decision."));
        }
        if attr.start_to_fire_timeout_seconds <= 0 {
            return Err(ServiceError::bad_request(
                "A valid StartToFireTimeoutSeconds is not set on decision.",
            ));
        }
        Ok(())
    }

    pub fn validate_timer_cancel_attributes(
        &self,
        attr: &CancelTimerDecisionAttributes,
    ) -> ServiceResult<()> {
        if attr.timer_id.is_empty() {
            return Err(ServiceError::bad_request("TimerId is not set on decision."));
        }
        Ok(())
    }

    // Presence of the record is structural for the three closing decisions;
    // size is enforced by the blob checker.
    pub fn validate_complete_workflow_execution_attributes(
        &self,
        _attr: &CompleteWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        Ok(())
    }

    pub fn validate_fail_workflow_execution_attributes(
        &self,
        _attr: &FailWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        Ok(())
    }

    pub fn validate_cancel_workflow_execution_attributes(
        &self,
        _attr: &CancelWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        Ok(())
    }

    pub fn validate_record_marker_attributes(
        &self,
        attr: &RecordMarkerDecisionAttributes,
    ) -> ServiceResult<()> {
        if attr.marker_name.is_empty() {
            return Err(ServiceError::bad_request("MarkerName is not set on decision."));
        }
        Ok(())
    }

    pub fn validate_continue_as_new_workflow_execution_attributes(
        &self,
        domain_name: &str,
        attr: &mut ContinueAsNewWorkflowExecutionDecisionAttributes,
        execution_info: &WorkflowExecutionInfo,
    ) -> ServiceResult<()> {
        // inherit from the current run whatever the decider left unset
        if attr.workflow_type.as_ref().map_or(true, |t| t.name.is_empty()) {
            attr.workflow_type = Some(WorkflowType::new(execution_info.workflow_type_name.clone()));
        }
        if attr.task_list.as_ref().map_or(true, |t| t.name.is_empty()) {
            attr.task_list = Some(TaskList::new(execution_info.task_list.clone()));
        }
        if attr.execution_start_to_close_timeout_seconds.unwrap_or(0) <= 0 {
            attr.execution_start_to_close_timeout_seconds =
                Some(execution_info.workflow_timeout_seconds);
        }
        if attr.task_start_to_close_timeout_seconds.unwrap_or(0) <= 0 {
            attr.task_start_to_close_timeout_seconds =
                Some(execution_info.decision_start_to_close_timeout_seconds);
        }

        let execution_timeout = attr.execution_start_to_close_timeout_seconds.unwrap_or(0);
        let task_timeout = attr.task_start_to_close_timeout_seconds.unwrap_or(0);
        if execution_timeout <= 0 {
            return Err(ServiceError::bad_request(
                "A valid ExecutionStartToCloseTimeoutSeconds is not set on decision.",
            ));
        }
        if task_timeout <= 0 {
            return Err(ServiceError::bad_request(
                "A valid TaskStartToCloseTimeoutSeconds is not set on decision.",
            ));
        }
        let ceiling = self.config.max_workflow_timeout_seconds(domain_name);
        if execution_timeout > ceiling || task_timeout > ceiling {
            return Err(ServiceError::bad_request(format!(
                "Workflow timeout exceeds the domain maximum of {ceiling} seconds.",
            )));
        }
        if let Some(backoff) = attr.backoff_start_interval_in_seconds {
            if backoff < 0 {
                return Err(ServiceError::bad_request(
                    "A valid BackoffStartIntervalInSeconds is not set on decision.",
                ));
            }
        }

        validate_retry_policy(attr.retry_policy.as_ref())
    }

    pub fn validate_start_child_execution_attributes(
        &self,
        domain_id: &str,
        target_domain_id: &str,
        attr: &mut StartChildWorkflowExecutionDecisionAttributes,
        parent_info: &WorkflowExecutionInfo,
    ) -> ServiceResult<()> {
        self.validate_cross_domain_call(domain_id, target_domain_id)?;

        if attr.workflow_id.is_empty() {
            return Err(ServiceError::bad_request("WorkflowId is not set on decision."));
        }
        if attr.workflow_type.as_ref().map_or(true, |t| t.name.is_empty()) {
            return Err(ServiceError::bad_request("WorkflowType is not set on decision."));
        }

        // inherit task list and timeouts from the parent when unset
        if attr.task_list.as_ref().map_or(true, |t| t.name.is_empty()) {
            attr.task_list = Some(TaskList::new(parent_info.task_list.clone()));
        }
        if attr.execution_start_to_close_timeout_seconds.unwrap_or(0) <= 0 {
            attr.execution_start_to_close_timeout_seconds =
                Some(parent_info.workflow_timeout_seconds);
        }
        if attr.task_start_to_close_timeout_seconds.unwrap_or(0) <= 0 {
            attr.task_start_to_close_timeout_seconds =
                Some(parent_info.decision_start_to_close_timeout_seconds);
        }
        if attr.execution_start_to_close_timeout_seconds.unwrap_or(0) <= 0
            || attr.task_start_to_close_timeout_seconds.unwrap_or(0) <= 0
        {
            return Err(ServiceError::bad_request(
                "A valid timeout may not be negative.",
            ));
        }

        validate_retry_policy(attr.retry_policy.as_ref())
    }

    pub fn validate_cancel_external_workflow_execution_attributes(
        &self,
        domain_id: &str,
        target_domain_id: &str,
        attr: &RequestCancelExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.validate_cross_domain_call(domain_id, target_domain_id)?;

        if attr.workflow_id.is_empty() {
            return Err(ServiceError::bad_request("WorkflowId is not set on decision."));
        }
        Ok(())
    }

    pub fn validate_signal_external_workflow_execution_attributes(
        &self,
        domain_id: &str,
        target_domain_id: &str,
        attr: &SignalExternalWorkflowExecutionDecisionAttributes,
    ) -> ServiceResult<()> {
        self.validate_cross_domain_call(domain_id, target_domain_id)?;

        let execution = attr
            .execution
            .as_ref()
            .ok_or_else(|| ServiceError::bad_request("Execution is not set on decision."))?;
        if execution.workflow_id.is_empty() {
            return Err(ServiceError::bad_request("WorkflowId is not set on decision."));
        }
        if attr.signal_name.is_empty() {
            return Err(ServiceError::bad_request("SignalName is not set on decision."));
        }
        Ok(())
    }

    /// Both ends of a cross-domain reference must resolve. Lookup failures
    /// are not decider mistakes and propagate as-is.
    fn validate_cross_domain_call(&self, domain_id: &str, target_domain_id: &str) -> ServiceResult<()> {
        if domain_id == target_domain_id {
            return Ok(());
        }
        self.domain_cache.get_domain_by_id(domain_id)?;
        self.domain_cache.get_domain_by_id(target_domain_id)?;
        Ok(())
    }
}

fn validate_retry_policy(policy: Option<&RetryPolicy>) -> ServiceResult<()> {
    let Some(policy) = policy else {
        return Ok(());
    };
    if policy.initial_interval_in_seconds <= 0 {
        return Err(ServiceError::bad_request(
            "InitialIntervalInSeconds must be greater than 0 on retry policy.",
        ));
    }
    if policy.backoff_coefficient < 1.0 {
        return Err(ServiceError::bad_request(
            "BackoffCoefficient cannot be less than 1 on retry policy.",
        ));
    }
    if policy.maximum_interval_in_seconds < 0 {
        return Err(ServiceError::bad_request(
            "MaximumIntervalInSeconds cannot be less than 0 on retry policy.",
        ));
    }
    if policy.maximum_interval_in_seconds > 0
        && policy.maximum_interval_in_seconds < policy.initial_interval_in_seconds
    {
        return Err(ServiceError::bad_request(
            "MaximumIntervalInSeconds cannot be less than InitialIntervalInSeconds on retry policy.",
        ));
    }
    if policy.maximum_attempts < 0 {
        return Err(ServiceError::bad_request(
            "MaximumAttempts cannot be less than 0 on retry policy.",
        ));
    }
    if policy.expiration_interval_in_seconds < 0 {
        return Err(ServiceError::bad_request(
            "ExpirationIntervalInSeconds cannot be less than 0 on retry policy.",
        ));
    }
    if policy.maximum_attempts == 0 && policy.expiration_interval_in_seconds == 0 {
        return Err(ServiceError::bad_request(
            "MaximumAttempts and ExpirationIntervalInSeconds are both 0. At least one of them must be specified.",
        ));
    }
    Ok(())
}
