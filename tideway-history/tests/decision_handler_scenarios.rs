//! End-to-end decision batch scenarios against the in-memory mutable state.

use std::sync::Arc;
use std::time::Duration;

use tideway_history::attr_validator::DecisionAttrValidator;
use tideway_history::config::HistoryConfig;
use tideway_history::decision_handler::{DecisionTaskHandler, DecisionVerdict};
use tideway_history::domain::{DomainCache, DomainCacheEntry, InMemoryDomainCache};
use tideway_history::metrics::{DecisionCounter, MetricsClient};
use tideway_history::mutable_state::MutableState;
use tideway_history::size_checker::BlobSizeChecker;
use tideway_history::tasks::{TimerTask, TransferTask};
use tideway_history::testing::InMemoryMutableState;
use tideway_shared::{
    ActivityType, CancelTimerDecisionAttributes, CompleteWorkflowExecutionDecisionAttributes,
    ContinueAsNewInitiator, ContinueAsNewWorkflowExecutionDecisionAttributes, Decision,
    DecisionTaskFailedCause, EventAttributes, EventType, FailWorkflowExecutionDecisionAttributes,
    RequestCancelActivityTaskDecisionAttributes,
    RequestCancelExternalWorkflowExecutionDecisionAttributes, RetryPolicy,
    ScheduleActivityTaskDecisionAttributes, SignalExternalWorkflowExecutionDecisionAttributes,
    StartChildWorkflowExecutionDecisionAttributes, StartTimerDecisionAttributes, TaskList,
    WorkflowExecution, WorkflowType, TERMINATE_REASON_PAYLOAD_SIZE_EXCEEDS_LIMIT,
};

const IDENTITY: &str = "worker@test";
const DECISION_TASK_COMPLETED_ID: i64 = 4;

struct Env {
    domain_cache: Arc<InMemoryDomainCache>,
    config: Arc<HistoryConfig>,
    metrics: Arc<MetricsClient>,
}

impl Env {
    fn new(config: HistoryConfig) -> Self {
        let domain_cache = InMemoryDomainCache::new();
        domain_cache.insert(DomainCacheEntry::register("d-1", "orders"));
        domain_cache.insert(DomainCacheEntry::register("d-2", "billing"));
        Self {
            domain_cache: Arc::new(domain_cache),
            config: Arc::new(config),
            metrics: Arc::new(MetricsClient::new()),
        }
    }

    fn handle(
        &self,
        state: &mut InMemoryMutableState,
        decisions: &[Decision],
    ) -> Result<DecisionVerdict, tideway_shared::error::ServiceError> {
        let domain_entry = self.domain_cache.get_domain("orders").unwrap();
        let validator = DecisionAttrValidator::new(self.domain_cache.clone(), self.config.clone());
        let checker = BlobSizeChecker::new(
            self.config.blob_size_limit_warn("orders"),
            self.config.blob_size_limit_error("orders"),
            IDENTITY,
            self.metrics.clone(),
        );
        let mut handler = DecisionTaskHandler::new(
            IDENTITY,
            DECISION_TASK_COMPLETED_ID,
            domain_entry,
            state,
            validator,
            checker,
            self.domain_cache.clone(),
            self.metrics.clone(),
        );
        handler.handle_decisions(decisions)?;
        Ok(handler.into_verdict())
    }
}

fn schedule_activity(id: &str, input: Vec<u8>) -> Decision {
    Decision::ScheduleActivityTask(Box::new(ScheduleActivityTaskDecisionAttributes {
        activity_id: id.to_string(),
        activity_type: Some(ActivityType::new("T")),
        task_list: Some(TaskList::new("tl")),
        input: Some(input),
        schedule_to_start_timeout_seconds: Some(10),
        start_to_close_timeout_seconds: Some(30),
        ..Default::default()
    }))
}

fn complete_workflow(result: Vec<u8>) -> Decision {
    Decision::CompleteWorkflowExecution(Box::new(CompleteWorkflowExecutionDecisionAttributes {
        result: Some(result),
    }))
}

fn start_timer(id: &str, seconds: i64) -> Decision {
    Decision::StartTimer(Box::new(StartTimerDecisionAttributes {
        timer_id: id.to_string(),
        start_to_fire_timeout_seconds: seconds,
    }))
}

#[test]
fn test_happy_path_schedule_activity() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");
    let prev_event_id = state.history().last().unwrap().event_id;

    let verdict = env
        .handle(&mut state, &[schedule_activity("a", vec![0u8; 1024])])
        .unwrap();

    let scheduled = state.events_of_type(EventType::ActivityTaskScheduled);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].event_id, prev_event_id + 1);

    match verdict {
        DecisionVerdict::Committed {
            transfer_tasks,
            timer_tasks,
            activity_not_started_cancelled,
        } => {
            assert!(!activity_not_started_cancelled);
            assert_eq!(
                transfer_tasks,
                vec![TransferTask::ActivityTask {
                    target_domain_id: "d-1".to_string(),
                    task_list: "tl".to_string(),
                    schedule_id: scheduled[0].event_id,
                }]
            );
            // schedule-to-start timeout for the new activity
            assert!(matches!(
                timer_tasks.as_slice(),
                [TimerTask::ActivityTimeout { event_id, .. }] if *event_id == scheduled[0].event_id
            ));
        }
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_cancel_activity_before_start() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");
    state
        .add_activity_task_scheduled_event(
            3,
            &ScheduleActivityTaskDecisionAttributes {
                activity_id: "a".to_string(),
                activity_type: Some(ActivityType::new("T")),
                task_list: Some(TaskList::new("tl")),
                schedule_to_close_timeout_seconds: Some(60),
                ..Default::default()
            },
        )
        .unwrap();

    let verdict = env
        .handle(
            &mut state,
            &[Decision::RequestCancelActivityTask(Box::new(
                RequestCancelActivityTaskDecisionAttributes {
                    activity_id: "a".to_string(),
                },
            ))],
        )
        .unwrap();

    let cancel_requested = state.events_of_type(EventType::ActivityTaskCancelRequested);
    let canceled = state.events_of_type(EventType::ActivityTaskCanceled);
    assert_eq!(cancel_requested.len(), 1);
    assert_eq!(canceled.len(), 1);
    assert_eq!(canceled[0].event_id, cancel_requested[0].event_id + 1);

    match verdict {
        DecisionVerdict::Committed {
            activity_not_started_cancelled,
            ..
        } => assert!(activity_not_started_cancelled),
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_cancel_activity_after_start_waits_for_worker() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");
    let (event, _) = state
        .add_activity_task_scheduled_event(
            3,
            &ScheduleActivityTaskDecisionAttributes {
                activity_id: "a".to_string(),
                activity_type: Some(ActivityType::new("T")),
                task_list: Some(TaskList::new("tl")),
                schedule_to_close_timeout_seconds: Some(60),
                ..Default::default()
            },
        )
        .unwrap();
    state.mark_activity_started(event.event_id);

    let verdict = env
        .handle(
            &mut state,
            &[Decision::RequestCancelActivityTask(Box::new(
                RequestCancelActivityTaskDecisionAttributes {
                    activity_id: "a".to_string(),
                },
            ))],
        )
        .unwrap();

    assert_eq!(state.events_of_type(EventType::ActivityTaskCancelRequested).len(), 1);
    assert!(state.events_of_type(EventType::ActivityTaskCanceled).is_empty());
    match verdict {
        DecisionVerdict::Committed {
            activity_not_started_cancelled,
            ..
        } => assert!(!activity_not_started_cancelled),
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_cancel_unknown_activity_records_failure_event() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[Decision::RequestCancelActivityTask(Box::new(
                RequestCancelActivityTaskDecisionAttributes {
                    activity_id: "missing".to_string(),
                },
            ))],
        )
        .unwrap();

    assert_eq!(
        state
            .events_of_type(EventType::RequestCancelActivityTaskFailed)
            .len(),
        1
    );
    assert!(matches!(verdict, DecisionVerdict::Committed { .. }));
}

#[test]
fn test_complete_with_buffered_events_fails_decision() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");
    state.buffer_signal("order-updated");

    let verdict = env
        .handle(&mut state, &[complete_workflow(Vec::new())])
        .unwrap();

    match verdict {
        DecisionVerdict::FailDecision { cause, message } => {
            assert_eq!(cause, DecisionTaskFailedCause::UnhandledDecision);
            assert!(message.is_empty());
        }
        _ => panic!("expected FailDecision verdict"),
    }
    assert!(state.events_of_type(EventType::WorkflowExecutionCompleted).is_empty());
    assert!(state.is_workflow_execution_running());
}

#[test]
fn test_two_completions_only_first_wins() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[complete_workflow(b"a".to_vec()), complete_workflow(b"b".to_vec())],
        )
        .unwrap();

    let completed = state.events_of_type(EventType::WorkflowExecutionCompleted);
    assert_eq!(completed.len(), 1);
    match &completed[0].attributes {
        Some(EventAttributes::WorkflowExecutionCompletedEventAttributes(attr)) => {
            assert_eq!(attr.result, Some(b"a".to_vec()));
        }
        other => panic!("unexpected attributes: {other:?}"),
    }
    assert_eq!(
        env.metrics.count(DecisionCounter::MultipleCompletionDecisions),
        1
    );
    assert!(matches!(verdict, DecisionVerdict::Committed { .. }));
}

#[test]
fn test_fail_with_retry_policy_continues_as_new() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run").with_retry_policy(
        RetryPolicy {
            initial_interval_in_seconds: 1,
            backoff_coefficient: 2.0,
            maximum_interval_in_seconds: 10,
            maximum_attempts: 3,
            non_retryable_error_reasons: vec![],
            expiration_interval_in_seconds: 0,
        },
        1,
    );

    let verdict = env
        .handle(
            &mut state,
            &[Decision::FailWorkflowExecution(Box::new(
                FailWorkflowExecutionDecisionAttributes {
                    reason: Some("boom".to_string()),
                    details: Some(b"details".to_vec()),
                },
            ))],
        )
        .unwrap();

    assert!(state.events_of_type(EventType::WorkflowExecutionFailed).is_empty());
    let continued = state.events_of_type(EventType::WorkflowExecutionContinuedAsNew);
    assert_eq!(continued.len(), 1);
    match &continued[0].attributes {
        Some(EventAttributes::WorkflowExecutionContinuedAsNewEventAttributes(attr)) => {
            assert_eq!(attr.backoff_start_interval_in_seconds, 1);
            assert_eq!(attr.initiator, Some(ContinueAsNewInitiator::RetryPolicy));
            assert_eq!(attr.failure_reason.as_deref(), Some("boom"));
        }
        other => panic!("unexpected attributes: {other:?}"),
    }

    match verdict {
        DecisionVerdict::ContinueAsNew { new_state, .. } => {
            assert!(new_state.is_workflow_execution_running());
            assert_eq!(new_state.execution_info().attempt, 2);
        }
        _ => panic!("expected ContinueAsNew verdict"),
    }
}

#[test]
fn test_complete_on_cron_schedule_continues_as_new() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run")
        .with_cron_backoff(Duration::from_secs(3600), "0 * * * *");

    let verdict = env
        .handle(&mut state, &[complete_workflow(b"result".to_vec())])
        .unwrap();

    assert!(state.events_of_type(EventType::WorkflowExecutionCompleted).is_empty());
    let continued = state.events_of_type(EventType::WorkflowExecutionContinuedAsNew);
    assert_eq!(continued.len(), 1);
    match &continued[0].attributes {
        Some(EventAttributes::WorkflowExecutionContinuedAsNewEventAttributes(attr)) => {
            assert_eq!(attr.backoff_start_interval_in_seconds, 3600);
            assert_eq!(attr.initiator, Some(ContinueAsNewInitiator::CronSchedule));
            assert_eq!(attr.failure_reason, None);
            assert_eq!(attr.last_completion_result, Some(b"result".to_vec()));
        }
        other => panic!("unexpected attributes: {other:?}"),
    }
    assert!(matches!(verdict, DecisionVerdict::ContinueAsNew { .. }));
}

#[test]
fn test_oversize_input_terminates_workflow() {
    let env = Env::new(HistoryConfig::new().with_blob_size_limits("orders", 1024, 4096));
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[
                schedule_activity("a", vec![0u8; 8192]),
                start_timer("t1", 60),
            ],
        )
        .unwrap();

    let terminated = state.events_of_type(EventType::WorkflowExecutionTerminated);
    assert_eq!(terminated.len(), 1);
    match &terminated[0].attributes {
        Some(EventAttributes::WorkflowExecutionTerminatedEventAttributes(attr)) => {
            assert_eq!(attr.reason, TERMINATE_REASON_PAYLOAD_SIZE_EXCEEDS_LIMIT);
        }
        other => panic!("unexpected attributes: {other:?}"),
    }
    assert!(state.events_of_type(EventType::ActivityTaskScheduled).is_empty());
    // the rest of the batch is not applied
    assert!(state.events_of_type(EventType::TimerStarted).is_empty());

    match verdict {
        DecisionVerdict::Committed { transfer_tasks, .. } => assert!(transfer_tasks.is_empty()),
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_warn_limit_emits_metric_and_continues() {
    let env = Env::new(HistoryConfig::new().with_blob_size_limits("orders", 1024, 1024 * 1024));
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(&mut state, &[schedule_activity("a", vec![0u8; 2048])])
        .unwrap();

    assert_eq!(env.metrics.count(DecisionCounter::DecisionBlobSizeWarn), 1);
    assert_eq!(state.events_of_type(EventType::ActivityTaskScheduled).len(), 1);
    assert!(matches!(verdict, DecisionVerdict::Committed { .. }));
}

#[test]
fn test_duplicate_activity_id_fails_decision() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[
                schedule_activity("a", Vec::new()),
                schedule_activity("a", Vec::new()),
            ],
        )
        .unwrap();

    match verdict {
        DecisionVerdict::FailDecision { cause, .. } => {
            assert_eq!(cause, DecisionTaskFailedCause::ScheduleActivityDuplicateId);
        }
        _ => panic!("expected FailDecision verdict"),
    }
}

#[test]
fn test_duplicate_timer_id_fails_decision() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(&mut state, &[start_timer("t1", 60), start_timer("t1", 30)])
        .unwrap();

    match verdict {
        DecisionVerdict::FailDecision { cause, .. } => {
            assert_eq!(cause, DecisionTaskFailedCause::StartTimerDuplicateId);
        }
        _ => panic!("expected FailDecision verdict"),
    }
}

#[test]
fn test_fail_decision_verdict_carries_no_tasks() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    // the first decision emits a transfer task, the second fails validation
    let verdict = env
        .handle(
            &mut state,
            &[schedule_activity("a", Vec::new()), start_timer("", 60)],
        )
        .unwrap();

    match verdict {
        DecisionVerdict::FailDecision { cause, message } => {
            assert_eq!(cause, DecisionTaskFailedCause::BadStartTimerAttributes);
            assert!(message.contains("TimerId"));
        }
        _ => panic!("expected FailDecision verdict"),
    }
}

#[test]
fn test_cancel_timer_not_found_records_failure_event() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[Decision::CancelTimer(Box::new(CancelTimerDecisionAttributes {
                timer_id: "missing".to_string(),
            }))],
        )
        .unwrap();

    assert_eq!(state.events_of_type(EventType::CancelTimerFailed).len(), 1);
    assert!(matches!(verdict, DecisionVerdict::Committed { .. }));
}

#[test]
fn test_cancel_timer_consumes_buffered_fire_and_allows_completion() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");
    state
        .add_timer_started_event(
            3,
            &StartTimerDecisionAttributes {
                timer_id: "t1".to_string(),
                start_to_fire_timeout_seconds: 1,
            },
        )
        .unwrap();
    state.buffer_timer_fired("t1");

    let verdict = env
        .handle(
            &mut state,
            &[
                Decision::CancelTimer(Box::new(CancelTimerDecisionAttributes {
                    timer_id: "t1".to_string(),
                })),
                complete_workflow(Vec::new()),
            ],
        )
        .unwrap();

    // cancelling consumed the buffered fire event, so the terminal decision
    // is honored
    assert_eq!(state.events_of_type(EventType::TimerCanceled).len(), 1);
    assert_eq!(state.events_of_type(EventType::WorkflowExecutionCompleted).len(), 1);
    assert!(matches!(verdict, DecisionVerdict::Committed { .. }));
}

#[test]
fn test_start_child_workflow_emits_transfer_task() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[Decision::StartChildWorkflowExecution(Box::new(
                StartChildWorkflowExecutionDecisionAttributes {
                    domain: Some("billing".to_string()),
                    workflow_id: "child-wf".to_string(),
                    workflow_type: Some(WorkflowType::new("BillingWorkflow")),
                    task_list: Some(TaskList::new("billing-tl")),
                    execution_start_to_close_timeout_seconds: Some(120),
                    task_start_to_close_timeout_seconds: Some(10),
                    ..Default::default()
                },
            ))],
        )
        .unwrap();

    let initiated = state.events_of_type(EventType::StartChildWorkflowExecutionInitiated);
    assert_eq!(initiated.len(), 1);
    match verdict {
        DecisionVerdict::Committed { transfer_tasks, .. } => {
            assert_eq!(
                transfer_tasks,
                vec![TransferTask::StartChildExecution {
                    target_domain_id: "d-2".to_string(),
                    target_workflow_id: "child-wf".to_string(),
                    initiated_id: initiated[0].event_id,
                }]
            );
        }
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_external_cancel_and_signal_emit_transfer_tasks() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[
                Decision::RequestCancelExternalWorkflowExecution(Box::new(
                    RequestCancelExternalWorkflowExecutionDecisionAttributes {
                        workflow_id: "other-wf".to_string(),
                        run_id: Some("other-run".to_string()),
                        ..Default::default()
                    },
                )),
                Decision::SignalExternalWorkflowExecution(Box::new(
                    SignalExternalWorkflowExecutionDecisionAttributes {
                        execution: Some(WorkflowExecution::new("other-wf", "other-run")),
                        signal_name: "poke".to_string(),
                        input: Some(b"hello".to_vec()),
                        ..Default::default()
                    },
                )),
            ],
        )
        .unwrap();

    let cancel_initiated =
        state.events_of_type(EventType::RequestCancelExternalWorkflowExecutionInitiated);
    let signal_initiated =
        state.events_of_type(EventType::SignalExternalWorkflowExecutionInitiated);
    assert_eq!(cancel_initiated.len(), 1);
    assert_eq!(signal_initiated.len(), 1);

    match verdict {
        DecisionVerdict::Committed { transfer_tasks, .. } => {
            assert_eq!(
                transfer_tasks,
                vec![
                    TransferTask::CancelExecution {
                        target_domain_id: "d-1".to_string(),
                        target_workflow_id: "other-wf".to_string(),
                        target_run_id: Some("other-run".to_string()),
                        target_child_workflow_only: false,
                        initiated_id: cancel_initiated[0].event_id,
                    },
                    TransferTask::SignalExecution {
                        target_domain_id: "d-1".to_string(),
                        target_workflow_id: "other-wf".to_string(),
                        target_run_id: Some("other-run".to_string()),
                        target_child_workflow_only: false,
                        initiated_id: signal_initiated[0].event_id,
                    },
                ]
            );
        }
        _ => panic!("expected Committed verdict"),
    }
}

#[test]
fn test_explicit_continue_as_new() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    let verdict = env
        .handle(
            &mut state,
            &[Decision::ContinueAsNewWorkflowExecution(Box::new(
                ContinueAsNewWorkflowExecutionDecisionAttributes {
                    input: Some(b"next".to_vec()),
                    ..Default::default()
                },
            ))],
        )
        .unwrap();

    assert_eq!(
        state
            .events_of_type(EventType::WorkflowExecutionContinuedAsNew)
            .len(),
        1
    );
    match verdict {
        DecisionVerdict::ContinueAsNew { new_state, .. } => {
            assert_eq!(new_state.execution_info().workflow_id, "wf");
            assert_ne!(new_state.execution_info().run_id, "run");
        }
        _ => panic!("expected ContinueAsNew verdict"),
    }
}

#[test]
fn test_event_ids_monotonic_across_batch() {
    let env = Env::new(HistoryConfig::default());
    let mut state = InMemoryMutableState::started("d-1", "wf", "run");

    env.handle(
        &mut state,
        &[
            schedule_activity("a", Vec::new()),
            schedule_activity("b", Vec::new()),
            start_timer("t1", 60),
            Decision::RecordMarker(Box::new(tideway_shared::RecordMarkerDecisionAttributes {
                marker_name: "side-effect".to_string(),
                details: Some(b"42".to_vec()),
                ..Default::default()
            })),
        ],
    )
    .unwrap();

    let ids: Vec<i64> = state.history().iter().map(|e| e.event_id).collect();
    assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
}
