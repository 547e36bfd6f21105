//! History service configuration.
//!
//! Limits are looked up per domain; a domain without an override falls back
//! to the global default.

use std::collections::HashMap;

/// Per-domain overridable limits consumed by the decision-task core.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Payload size at which a warning metric is emitted. Default: 256 KiB.
    pub default_blob_size_limit_warn: usize,
    /// Payload size at which the workflow is terminated. Default: 2 MiB.
    pub default_blob_size_limit_error: usize,
    /// Ceiling on workflow execution timeouts. Default: 31 days.
    pub default_max_workflow_timeout_seconds: i32,

    per_domain: HashMap<String, DomainLimits>,
}

#[derive(Debug, Clone, Default)]
struct DomainLimits {
    blob_size_limit_warn: Option<usize>,
    blob_size_limit_error: Option<usize>,
    max_workflow_timeout_seconds: Option<i32>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_blob_size_limit_warn: 256 * 1024,
            default_blob_size_limit_error: 2 * 1024 * 1024,
            default_max_workflow_timeout_seconds: 31 * 24 * 3600,
            per_domain: HashMap::new(),
        }
    }
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the blob-size limits for one domain.
    pub fn with_blob_size_limits(mut self, domain: &str, warn: usize, error: usize) -> Self {
        let limits = self.per_domain.entry(domain.to_string()).or_default();
        limits.blob_size_limit_warn = Some(warn);
        limits.blob_size_limit_error = Some(error);
        self
    }

    /// Override the workflow timeout ceiling for one domain.
    pub fn with_max_workflow_timeout(mut self, domain: &str, seconds: i32) -> Self {
        self.per_domain
            .entry(domain.to_string())
            .or_default()
            .max_workflow_timeout_seconds = Some(seconds);
        self
    }

    pub fn blob_size_limit_warn(&self, domain: &str) -> usize {
        self.per_domain
            .get(domain)
            .and_then(|l| l.blob_size_limit_warn)
            .unwrap_or(self.default_blob_size_limit_warn)
    }

    pub fn blob_size_limit_error(&self, domain: &str) -> usize {
        self.per_domain
            .get(domain)
            .and_then(|l| l.blob_size_limit_error)
            .unwrap_or(self.default_blob_size_limit_error)
    }

    pub fn max_workflow_timeout_seconds(&self, domain: &str) -> i32 {
        self.per_domain
            .get(domain)
            .and_then(|l| l.max_workflow_timeout_seconds)
            .unwrap_or(self.default_max_workflow_timeout_seconds)
    }
}
