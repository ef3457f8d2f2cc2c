//! The `Workflow` — the process-scoped registry, session cloner, and idle
//! reaper.
//!
//! A `Workflow` is created explicitly (`Workflow::new(config)`), never a
//! hidden global: graph authors pass the returned `Arc<Workflow>` around, so
//! multiple independent workflows can coexist in one process (tests build a
//! fresh one per case).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;

use nodes::{ExecutableNode, WorkflowHandle};

use crate::config::{NodeConfig, WorkflowConfig};
use crate::error::EngineError;
use crate::node::{NodeHandle, NodeTemplate};
use crate::plot::GraphSnapshot;
use crate::session::Session;

/// Process-wide (or test-wide) owner of the template registry, the live
/// session map, and the reaper task.
pub struct Workflow {
    config: WorkflowConfig,
    /// Registration order is preserved so `plot()` and diagnostics read
    /// deterministically; lookups by name still go through the same map.
    templates: Mutex<IndexMap<String, Arc<NodeTemplate>>>,
    /// Cross-session shared resource: creation, reaping, and touching must
    /// never serialize unrelated sessions behind one lock, so this is a
    /// concurrent map rather than a `Mutex<HashMap<_>>`.
    sessions: DashMap<String, Arc<Session>>,
    frozen: AtomicBool,
    reaper_started: AtomicBool,
}

impl Workflow {
    pub fn new(config: WorkflowConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            templates: Mutex::new(IndexMap::new()),
            sessions: DashMap::new(),
            frozen: AtomicBool::new(false),
            reaper_started: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Register a new template node. Fails with `duplicate_name` if the name
    /// is already taken, or `topology_frozen` once any trigger anywhere in
    /// the workflow has dispatched.
    pub fn register(
        self: &Arc<Self>,
        name: impl Into<String>,
        body: Arc<dyn ExecutableNode>,
        config: NodeConfig,
    ) -> Result<NodeHandle, EngineError> {
        self.ensure_mutable()?;
        let name = name.into();
        let mut templates = self.templates.lock();
        if templates.contains_key(&name) {
            return Err(EngineError::DuplicateName(name));
        }
        tracing::debug!(node = %name, "registering node template");
        templates.insert(name.clone(), Arc::new(NodeTemplate::new(name.clone(), body, config)));
        Ok(NodeHandle {
            workflow: self.clone(),
            name,
        })
    }

    pub(crate) fn template(&self, name: &str) -> Result<Arc<NodeTemplate>, EngineError> {
        self.templates
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownNode(name.to_string()))
    }

    pub(crate) fn ensure_mutable(&self) -> Result<(), EngineError> {
        if self.frozen.load(Ordering::Acquire) {
            Err(EngineError::TopologyFrozen)
        } else {
            Ok(())
        }
    }

    /// Freeze the topology: called on the first `NodeHandle::run` dispatched
    /// anywhere in the workflow. Idempotent.
    pub(crate) fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            tracing::debug!("workflow topology frozen on first trigger");
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Look up the session for `session_id`, creating it (by deep-cloning
    /// every template) if this is the first reference.
    pub(crate) fn get_or_create_session(self: &Arc<Self>, session_id: &str) -> Arc<Session> {
        if let Some(existing) = self.sessions.get(session_id) {
            return existing.clone();
        }
        let templates = self.templates.lock().clone();
        let session = Arc::new(Session::new(session_id, &templates, &self.config));
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| session)
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Start the reaper task on first trigger. A no-op when the TTL is
    /// `None` — in that case no background task is ever spawned — or when
    /// already started.
    pub(crate) fn ensure_reaper_started(self: &Arc<Self>) {
        let Some(ttl) = self.config.session_ttl else {
            return;
        };
        if self.reaper_started.swap(true, Ordering::AcqRel) {
            return;
        }
        let workflow = self.clone();
        tokio::spawn(async move { workflow.reap_loop(ttl).await });
        tracing::debug!(ttl_secs = ttl.as_secs_f64(), "reaper task started");
    }

    async fn reap_loop(self: Arc<Self>, ttl: Duration) {
        loop {
            tokio::time::sleep(ttl).await;
            self.reap_once(ttl);
        }
    }

    /// One reaping pass: drop every session idle longer than `ttl`. Exposed
    /// separately from the loop so tests can drive it deterministically
    /// without sleeping on the real TTL.
    pub fn reap_once(&self, ttl: Duration) {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.idle_for() < ttl);
        let reaped = before - self.sessions.len();
        if reaped > 0 {
            tracing::debug!(reaped, remaining = self.sessions.len(), "reaped idle sessions");
        }
    }

    /// A diagnostic snapshot of the registered template topology: node
    /// names, their configured routing default, and declared edges. Purely
    /// introspective — never consulted by the dispatch path.
    pub fn plot(&self) -> GraphSnapshot {
        GraphSnapshot::from_templates(&self.templates.lock())
    }
}

impl WorkflowHandle for Workflow {
    fn session_ttl(&self) -> Option<Duration> {
        self.config.session_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodes::mock::MockNode;

    #[test]
    fn duplicate_registration_is_rejected() {
        let workflow = Workflow::new(WorkflowConfig::default());
        workflow
            .register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())
            .unwrap();
        let err = workflow
            .register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateName(name) if name == "a"));
    }

    #[test]
    fn registration_after_freeze_is_rejected() {
        let workflow = Workflow::new(WorkflowConfig::default());
        workflow
            .register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())
            .unwrap();
        workflow.freeze();
        let err = workflow
            .register("b", Arc::new(MockNode::summing("b")), NodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::TopologyFrozen));
    }

    #[test]
    fn sessions_are_created_lazily_and_cached_by_id() {
        let workflow = Workflow::new(WorkflowConfig::default());
        workflow
            .register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())
            .unwrap();
        assert_eq!(workflow.session_count(), 0);
        let s1 = workflow.get_or_create_session("s1");
        let s1_again = workflow.get_or_create_session("s1");
        assert_eq!(workflow.session_count(), 1);
        assert_eq!(s1.id(), s1_again.id());
    }

    #[test]
    fn reap_once_drops_only_idle_sessions() {
        let workflow = Workflow::new(WorkflowConfig::default());
        workflow
            .register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())
            .unwrap();
        let s1 = workflow.get_or_create_session("s1");
        s1.touch();
        workflow.reap_once(Duration::from_millis(0));
        assert!(!workflow.has_session("s1"));
    }
}
