//! One isolated, per-`session_id` clone of the whole node graph.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::time::Instant;

use nodes::{RoutingPolicy, SessionHandle, SessionMemory};
use queue::InputsQueue;

use crate::config::WorkflowConfig;
use crate::execution::Execution;
use crate::node::NodeTemplate;

/// A cloned node instance, scoped to one session: its own boxed body, its
/// own fan-in queue, its own re-entrancy flag. Never shared with another
/// session, and never registered back into the template registry.
pub struct NodeInstance {
    pub name: String,
    pub body: Box<dyn nodes::ExecutableNode>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub routing_default: RoutingPolicy,
    pub queue: InputsQueue,
    running: AtomicBool,
}

impl NodeInstance {
    fn from_template(template: &NodeTemplate) -> Self {
        let inputs = template.inputs();
        let outputs = template.outputs();
        Self {
            name: template.name.clone(),
            body: template.new_instance(),
            queue: InputsQueue::new(template.name.clone(), inputs.clone()),
            inputs,
            outputs,
            routing_default: template.config.routing_default_policy,
            running: AtomicBool::new(false),
        }
    }

    /// Claim the re-entrancy flag for one activation. `true` means this
    /// caller is the one that runs the node body; `false` means another
    /// activation is already in flight for this node in this session and
    /// this call must return immediately — the already-running activation
    /// will pick up the input just enqueued.
    pub fn try_claim(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// A deep, independent copy of the whole graph of node templates for one
/// `session_id`: per-session nodes, an ordered execution history, and a
/// shared memory scratchpad. Mutations inside one session are never visible
/// to another, even for concurrent triggers against the same node name.
pub struct Session {
    id: String,
    nodes: IndexMap<String, Arc<NodeInstance>>,
    executions: Mutex<IndexMap<String, Arc<Execution>>>,
    memory: Mutex<SessionMemory>,
    last_touched: Mutex<Instant>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        templates: &IndexMap<String, Arc<NodeTemplate>>,
        config: &WorkflowConfig,
    ) -> Self {
        let id = id.into();
        tracing::debug!(session = %id, templates = templates.len(), "cloning node templates into new session");
        let nodes = templates
            .iter()
            .map(|(name, template)| (name.clone(), Arc::new(NodeInstance::from_template(template))))
            .collect();
        Self {
            id,
            nodes,
            executions: Mutex::new(IndexMap::new()),
            memory: Mutex::new(SessionMemory::new(config.messages_memory_cap)),
            last_touched: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node(&self, name: &str) -> Option<Arc<NodeInstance>> {
        self.nodes.get(name).cloned()
    }

    /// The `Execution` record for one execution id, created lazily on first
    /// reference (never user-visible as a distinct "unknown_execution").
    pub fn execution(&self, execution_id: &str) -> Arc<Execution> {
        let mut executions = self.executions.lock();
        executions
            .entry(execution_id.to_string())
            .or_insert_with(|| Arc::new(Execution::new(execution_id)))
            .clone()
    }

    pub fn execution_count(&self) -> usize {
        self.executions.lock().len()
    }

    pub fn touch(&self) {
        *self.last_touched.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.lock().elapsed()
    }
}

impl SessionHandle for Session {
    fn id(&self) -> &str {
        &self.id
    }

    fn memory(&self) -> &Mutex<SessionMemory> {
        // Memory access counts as a session touch too, per §4.4.
        self.touch();
        &self.memory
    }
}
