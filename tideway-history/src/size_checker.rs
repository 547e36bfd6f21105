//! Payload size guard for decision attributes.
//!
//! Oversize payloads are not an error: crossing the error limit terminates
//! the workflow in the same commit and the handler stops applying further
//! decisions. Crossing the warn limit only emits a metric.

use std::sync::Arc;

use tracing::warn;

use tideway_shared::error::ServiceResult;
use tideway_shared::TERMINATE_REASON_PAYLOAD_SIZE_EXCEEDS_LIMIT;

use crate::metrics::{DecisionCounter, MetricsClient};
use crate::mutable_state::MutableState;

pub struct BlobSizeChecker {
    size_limit_warn: usize,
    size_limit_error: usize,
    identity: String,
    metrics: Arc<MetricsClient>,
}

impl BlobSizeChecker {
    pub fn new(
        size_limit_warn: usize,
        size_limit_error: usize,
        identity: impl Into<String>,
        metrics: Arc<MetricsClient>,
    ) -> Self {
        Self {
            size_limit_warn,
            size_limit_error,
            identity: identity.into(),
            metrics,
        }
    }

    /// Returns `Ok(true)` when the payload exceeded the error limit and the
    /// workflow was terminated; the caller must stop processing decisions.
    pub fn fail_workflow_if_blob_size_exceeds_limit(
        &self,
        mutable_state: &mut dyn MutableState,
        blob: Option<&[u8]>,
        message: &str,
    ) -> ServiceResult<bool> {
        let size = blob.map_or(0, <[u8]>::len);
        if size <= self.size_limit_warn {
            return Ok(false);
        }

        let info = mutable_state.execution_info();
        let workflow_id = info.workflow_id.clone();
        let run_id = info.run_id.clone();
        if size <= self.size_limit_error {
            self.metrics.inc(DecisionCounter::DecisionBlobSizeWarn);
            warn!(%workflow_id, %run_id, size, "Blob size close to the limit.");
            return Ok(false);
        }

        warn!(%workflow_id, %run_id, size, "Blob size exceeds limit.");
        mutable_state.add_workflow_execution_terminated_event(
            TERMINATE_REASON_PAYLOAD_SIZE_EXCEEDS_LIMIT,
            message.as_bytes(),
            &self.identity,
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryMutableState;
    use tideway_shared::EventType;

    fn checker(metrics: Arc<MetricsClient>) -> BlobSizeChecker {
        BlobSizeChecker::new(1024, 4096, "worker@test", metrics)
    }

    #[test]
    fn test_under_warn_limit_no_effect() {
        let metrics = Arc::new(MetricsClient::new());
        let mut state = InMemoryMutableState::started("d-1", "wf", "run");
        let failed = checker(metrics.clone())
            .fail_workflow_if_blob_size_exceeds_limit(&mut state, Some(&[0u8; 512]), "too big")
            .unwrap();
        assert!(!failed);
        assert_eq!(metrics.count(DecisionCounter::DecisionBlobSizeWarn), 0);
        assert!(state.is_workflow_execution_running());
    }

    #[test]
    fn test_between_limits_emits_metric() {
        let metrics = Arc::new(MetricsClient::new());
        let mut state = InMemoryMutableState::started("d-1", "wf", "run");
        let failed = checker(metrics.clone())
            .fail_workflow_if_blob_size_exceeds_limit(&mut state, Some(&[0u8; 2048]), "too big")
            .unwrap();
        assert!(!failed);
        assert_eq!(metrics.count(DecisionCounter::DecisionBlobSizeWarn), 1);
        assert!(state.is_workflow_execution_running());
    }

    #[test]
    fn test_over_error_limit_terminates_workflow() {
        let metrics = Arc::new(MetricsClient::new());
        let mut state = InMemoryMutableState::started("d-1", "wf", "run");
        let failed = checker(metrics)
            .fail_workflow_if_blob_size_exceeds_limit(&mut state, Some(&[0u8; 8192]), "too big")
            .unwrap();
        assert!(failed);
        assert!(!state.is_workflow_execution_running());

        let last = state.history().last().unwrap().clone();
        assert_eq!(last.event_type, EventType::WorkflowExecutionTerminated);
    }

    #[test]
    fn test_missing_blob_counts_as_empty() {
        let metrics = Arc::new(MetricsClient::new());
        let mut state = InMemoryMutableState::started("d-1", "wf", "run");
        let failed = checker(metrics)
            .fail_workflow_if_blob_size_exceeds_limit(&mut state, None, "too big")
            .unwrap();
        assert!(!failed);
    }
}
