//! Continue-as-new attribute construction for cron and retry recurrences.
//!
//! A retried or cron-scheduled workflow completes its current run and starts
//! the next one carrying forward the original start attributes. The only
//! differences between the two paths are the initiator and whether the
//! failure fields travel to the next run.

use tideway_shared::{
    ContinueAsNewInitiator, ContinueAsNewWorkflowExecutionDecisionAttributes,
    WorkflowExecutionStartedEventAttributes,
};

/// Build the continue-as-new record for the next run from the original
/// `WorkflowExecutionStarted` attributes.
pub fn continue_as_new_attributes(
    start_attr: &WorkflowExecutionStartedEventAttributes,
    backoff_seconds: i32,
    initiator: ContinueAsNewInitiator,
    failure_reason: Option<String>,
    failure_details: Option<Vec<u8>>,
    last_completion_result: Option<Vec<u8>>,
) -> ContinueAsNewWorkflowExecutionDecisionAttributes {
    ContinueAsNewWorkflowExecutionDecisionAttributes {
        workflow_type: start_attr.workflow_type.clone(),
        task_list: start_attr.task_list.clone(),
        retry_policy: start_attr.retry_policy.clone(),
        input: start_attr.input.clone(),
        execution_start_to_close_timeout_seconds: Some(
            start_attr.execution_start_to_close_timeout_seconds,
        ),
        task_start_to_close_timeout_seconds: Some(start_attr.task_start_to_close_timeout_seconds),
        cron_schedule: start_attr.cron_schedule.clone(),
        backoff_start_interval_in_seconds: Some(backoff_seconds),
        initiator: Some(initiator),
        failure_reason,
        failure_details,
        last_completion_result,
        header: None,
        memo: None,
        search_attributes: None,
    }
}
