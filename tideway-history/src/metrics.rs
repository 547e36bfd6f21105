//! In-process counters for the decision-task handler.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Counters the handler increments while processing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionCounter {
    ScheduleActivity,
    CancelActivity,
    StartTimer,
    CancelTimer,
    CompleteWorkflow,
    FailWorkflow,
    CancelWorkflow,
    RecordMarker,
    ContinueAsNew,
    StartChildWorkflow,
    CancelExternalWorkflow,
    SignalExternalWorkflow,
    MultipleCompletionDecisions,
    DecisionBlobSizeWarn,
    FailedDecisions,
}

/// Thread-safe counter store.
#[derive(Default)]
pub struct MetricsClient {
    counters: RwLock<HashMap<DecisionCounter, u64>>,
}

impl MetricsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, counter: DecisionCounter) {
        *self.counters.write().entry(counter).or_insert(0) += 1;
    }

    pub fn count(&self, counter: DecisionCounter) -> u64 {
        self.counters.read().get(&counter).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let metrics = MetricsClient::new();
        assert_eq!(metrics.count(DecisionCounter::StartTimer), 0);
        metrics.inc(DecisionCounter::StartTimer);
        metrics.inc(DecisionCounter::StartTimer);
        assert_eq!(metrics.count(DecisionCounter::StartTimer), 2);
        assert_eq!(metrics.count(DecisionCounter::CancelTimer), 0);
    }
}
