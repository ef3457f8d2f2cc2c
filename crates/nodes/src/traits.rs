//! The `ExecutableNode` trait — the contract every node body must fulfil.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ExecutorContext;
use crate::error::NodeError;

/// The user-supplied body of a graph vertex.
///
/// Registered once as a template; `new_instance` is called once per session
/// to produce an independent, freshly-stateful clone scoped to that session
/// alone. All built-in nodes and user-authored nodes alike implement this.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Run the node body against the gathered inputs for one activation.
    async fn execute(&self, ctx: &mut ExecutorContext<'_>) -> Result<Value, NodeError>;

    /// Produce a fresh, independent instance for a new session. Implementations
    /// that carry per-session mutable state (counters, local memory, ...) must
    /// reset it here rather than sharing it with the template.
    fn new_instance(&self) -> Box<dyn ExecutableNode>;
}
