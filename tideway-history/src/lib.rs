//! Decision-task handling core of the tideway history service.
//!
//! A workflow execution advances when a decider responds to a decision task
//! with a batch of decisions. This crate validates that response, applies it
//! to the run's mutable state, and accumulates the transfer and timer tasks
//! the decisions imply. The caller commits the mutated state together with
//! the accumulated tasks in one persistence transaction; this crate never
//! persists anything itself.

pub mod attr_validator;
pub mod backoff;
pub mod config;
pub mod decision_handler;
pub mod domain;
pub mod execution;
pub mod metrics;
pub mod mutable_state;
pub mod recurrence;
pub mod size_checker;
pub mod tasks;
pub mod testing;
pub mod timer_builder;

pub use attr_validator::DecisionAttrValidator;
pub use decision_handler::{DecisionTaskHandler, DecisionVerdict};
pub use domain::{DomainCache, DomainCacheEntry, InMemoryDomainCache};
pub use execution::{
    ActivityInfo, ChildExecutionInfo, RequestCancelInfo, SignalInfo, TimerInfo, WorkflowExecutionInfo,
    WorkflowState,
};
pub use metrics::{DecisionCounter, MetricsClient};
pub use mutable_state::MutableState;
pub use size_checker::BlobSizeChecker;
pub use tasks::{TimerTask, TransferTask};
pub use timer_builder::TimerBuilder;
