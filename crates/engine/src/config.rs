//! Typed configuration for nodes and workflows.
//!
//! Both structs derive sane defaults and are built up with `with_*` calls,
//! matching the teacher's `ExecutorConfig` pattern.

use std::time::Duration;

use nodes::RoutingPolicy;

/// Per-node configuration supplied at registration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Routing disposition applied to every successor before the node body
    /// runs; the body may override individual entries via `ctx.routing`.
    pub routing_default_policy: RoutingPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            routing_default_policy: RoutingPolicy::Broadcast,
        }
    }
}

impl NodeConfig {
    pub fn with_routing_default(mut self, policy: RoutingPolicy) -> Self {
        self.routing_default_policy = policy;
        self
    }
}

/// Default cap on the number of recent messages retained in session memory.
pub const DEFAULT_MESSAGES_MEMORY_CAP: usize = 10;

/// Workflow-wide configuration: the reaper period/idle threshold and the
/// bound on session memory.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Reaper period and idle threshold. `None` disables the reaper
    /// entirely — no background task is ever spawned.
    pub session_ttl: Option<Duration>,
    /// Fixed maximum for a session's recent-messages deque.
    pub messages_memory_cap: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            session_ttl: None,
            messages_memory_cap: DEFAULT_MESSAGES_MEMORY_CAP,
        }
    }
}

impl WorkflowConfig {
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    pub fn with_messages_memory_cap(mut self, cap: usize) -> Self {
        self.messages_memory_cap = cap;
        self
    }
}
