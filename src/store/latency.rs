//! Simulated I/O latency for store operations.
//!
//! Every store call waits on its [`Latency`] before touching the collection,
//! standing in for the network round trip a remote directory would cost.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Store operations that incur simulated latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
    Search,
    GetByStatus,
    GetStats,
    GetFamilyMembers,
    GetFamilyOptions,
    GetByMemberId,
    GetByDateRange,
    GetByEventType,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::GetAll,
        Operation::GetById,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Search,
        Operation::GetByStatus,
        Operation::GetStats,
        Operation::GetFamilyMembers,
        Operation::GetFamilyOptions,
        Operation::GetByMemberId,
        Operation::GetByDateRange,
        Operation::GetByEventType,
    ];

    /// Config key for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetAll => "get_all",
            Operation::GetById => "get_by_id",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Search => "search",
            Operation::GetByStatus => "get_by_status",
            Operation::GetStats => "get_stats",
            Operation::GetFamilyMembers => "get_family_members",
            Operation::GetFamilyOptions => "get_family_options",
            Operation::GetByMemberId => "get_by_member_id",
            Operation::GetByDateRange => "get_by_date_range",
            Operation::GetByEventType => "get_by_event_type",
        }
    }

    /// Default simulated delay in milliseconds
    pub fn default_delay_ms(&self) -> u64 {
        match self {
            Operation::GetAll => 300,
            Operation::GetById => 200,
            Operation::Create => 400,
            Operation::Update => 350,
            Operation::Delete => 300,
            Operation::Search => 250,
            Operation::GetByStatus => 200,
            Operation::GetStats => 300,
            Operation::GetFamilyMembers => 200,
            Operation::GetFamilyOptions => 250,
            Operation::GetByMemberId => 250,
            Operation::GetByDateRange => 300,
            Operation::GetByEventType => 250,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.as_str() == key)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of artificial suspension before a store operation completes
#[async_trait]
pub trait Latency: Send + Sync {
    /// Suspend the caller for as long as `op` should take.
    async fn wait(&self, op: Operation);
}

/// Latency that returns immediately; used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn wait(&self, _op: Operation) {}
}

/// Timer-backed latency with per-operation overrides.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLatency {
    overrides: HashMap<Operation, Duration>,
}

impl SimulatedLatency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the delay for one operation.
    pub fn with_override(mut self, op: Operation, delay: Duration) -> Self {
        self.overrides.insert(op, delay);
        self
    }

    /// Build from config-style `operation name -> milliseconds` pairs.
    ///
    /// Unknown operation names are logged and skipped.
    pub fn from_overrides(overrides: &HashMap<String, u64>) -> Self {
        let mut latency = Self::new();
        for (key, ms) in overrides {
            match Operation::from_key(key) {
                Some(op) => latency = latency.with_override(op, Duration::from_millis(*ms)),
                None => log::warn!("Ignoring latency override for unknown operation: {}", key),
            }
        }
        latency
    }

    /// Delay that will be applied to `op`.
    pub fn delay_for(&self, op: Operation) -> Duration {
        self.overrides
            .get(&op)
            .copied()
            .unwrap_or_else(|| Duration::from_millis(op.default_delay_ms()))
    }
}

#[async_trait]
impl Latency for SimulatedLatency {
    async fn wait(&self, op: Operation) {
        let delay = self.delay_for(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
