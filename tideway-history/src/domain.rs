//! Domain cache contract.
//!
//! Domains namespace workflow executions. The decision handler resolves
//! cross-domain targets through this cache; in production the cache fronts
//! the persistence layer, refreshing entries in the background. A cache miss
//! may fetch synchronously, which is why lookups are fallible.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tideway_shared::error::{ServiceError, ServiceResult};

/// Domain registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    Registered,
    Deprecated,
    Deleted,
}

/// Immutable identity of a domain
#[derive(Debug, Clone)]
pub struct DomainInfo {
    pub id: String,
    pub name: String,
    pub status: DomainStatus,
    pub description: String,
}

/// Per-domain configuration carried on the cache entry
#[derive(Debug, Clone)]
pub struct DomainConfig {
    pub retention_days: i32,
    pub emit_metric: bool,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            retention_days: 7,
            emit_metric: true,
        }
    }
}

/// One cached domain record.
#[derive(Debug, Clone)]
pub struct DomainCacheEntry {
    info: DomainInfo,
    config: DomainConfig,
    failover_version: i64,
}

impl DomainCacheEntry {
    pub fn new(info: DomainInfo, config: DomainConfig, failover_version: i64) -> Self {
        Self {
            info,
            config,
            failover_version,
        }
    }

    /// Register-style constructor used by tests and single-node setups.
    pub fn register(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            info: DomainInfo {
                id: id.into(),
                name: name.into(),
                status: DomainStatus::Registered,
                description: String::new(),
            },
            config: DomainConfig::default(),
            failover_version: 0,
        }
    }

    pub fn info(&self) -> &DomainInfo {
        &self.info
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    pub fn failover_version(&self) -> i64 {
        self.failover_version
    }
}

/// Read-only lookup surface the decision core depends on.
pub trait DomainCache: Send + Sync {
    fn get_domain(&self, name: &str) -> ServiceResult<Arc<DomainCacheEntry>>;
    fn get_domain_by_id(&self, id: &str) -> ServiceResult<Arc<DomainCacheEntry>>;
}

/// In-memory registry keyed by both name and id.
#[derive(Default)]
pub struct InMemoryDomainCache {
    by_name: RwLock<HashMap<String, Arc<DomainCacheEntry>>>,
    by_id: RwLock<HashMap<String, Arc<DomainCacheEntry>>>,
}

impl InMemoryDomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: DomainCacheEntry) {
        let entry = Arc::new(entry);
        self.by_name
            .write()
            .insert(entry.info().name.clone(), entry.clone());
        self.by_id.write().insert(entry.info().id.clone(), entry);
    }
}

impl DomainCache for InMemoryDomainCache {
    fn get_domain(&self, name: &str) -> ServiceResult<Arc<DomainCacheEntry>> {
        self.by_name
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::entity_not_exists(format!("Domain {name} does not exist.")))
    }

    fn get_domain_by_id(&self, id: &str) -> ServiceResult<Arc<DomainCacheEntry>> {
        self.by_id
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::entity_not_exists(format!("Domain {id} does not exist.")))
    }
}
