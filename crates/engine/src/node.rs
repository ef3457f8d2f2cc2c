//! Node templates (graph-authored) and the handles used to wire and trigger
//! them.
//!
//! The template/clone split replaces the dynamic class surgery an
//! interpreted sibling implementation would use: a `NodeTemplate` is fixed
//! at registration and produces, via `ExecutableNode::new_instance`, one
//! independent [`crate::session::NodeInstance`] per session. No reflection
//! or runtime method rebinding is involved.

use std::sync::Arc;

use parking_lot::Mutex;

use nodes::{
    not_processed, ExecutableNode, ExecutionStatus, ExecutorContext, Inputs, IoRecord, IoSource,
    IoStatus, RoutingTable, SessionHandle, WorkflowHandle,
};

use crate::config::NodeConfig;
use crate::error::EngineError;
use crate::session::{NodeInstance, Session};
use crate::workflow::Workflow;

/// A graph-authored vertex: a unique name, the user's `execute` body, its
/// routing default, and its topology (declared input/output edge names, in
/// `connect()` call order). Frozen — no further `connect` accepted — once
/// the owning workflow's first trigger has dispatched.
pub struct NodeTemplate {
    pub name: String,
    body: Arc<dyn ExecutableNode>,
    pub config: NodeConfig,
    inputs: Mutex<Vec<String>>,
    outputs: Mutex<Vec<String>>,
}

impl NodeTemplate {
    pub fn new(name: impl Into<String>, body: Arc<dyn ExecutableNode>, config: NodeConfig) -> Self {
        Self {
            name: name.into(),
            body,
            config,
            inputs: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().clone()
    }

    pub(crate) fn new_instance(&self) -> Box<dyn ExecutableNode> {
        self.body.new_instance()
    }

    fn push_output(&self, name: String) {
        self.outputs.lock().push(name);
    }

    fn push_input(&self, name: String) {
        self.inputs.lock().push(name);
    }
}

/// A lightweight, cloneable reference to a registered template: the surface
/// graph authors use to wire topology, and external callers use to
/// dispatch triggers.
#[derive(Clone)]
pub struct NodeHandle {
    pub(crate) workflow: Arc<Workflow>,
    pub(crate) name: String,
}

impl NodeHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `other` as a successor of `self` (and `self` as a predecessor
    /// of `other`), in declaration order. Illegal once any trigger has been
    /// dispatched anywhere in the workflow.
    pub fn connect(&self, other: &NodeHandle) -> Result<(), EngineError> {
        self.workflow.ensure_mutable()?;
        let from = self.workflow.template(&self.name)?;
        let to = self.workflow.template(&other.name)?;
        tracing::debug!(from = %self.name, to = %other.name, "connecting nodes");
        from.push_output(other.name.clone());
        to.push_input(self.name.clone());
        Ok(())
    }

    /// Dispatch one IO record into this node. Returns the terminal IO
    /// records reachable from this activation, in fan-out declaration
    /// order, or the error raised by the first node (anywhere downstream)
    /// whose `execute` failed.
    pub async fn run(&self, io: IoRecord) -> Result<Vec<IoRecord>, EngineError> {
        self.workflow.freeze();
        self.workflow.ensure_reaper_started();

        let session_id = io.source.session_id.clone();
        let execution_id = io.source.execution_id.clone();

        let session = self.workflow.get_or_create_session(&session_id);
        session.touch();

        let instance = session
            .node(&self.name)
            .ok_or_else(|| EngineError::UnknownNode(self.name.clone()))?;

        instance.queue.put(io);

        if !instance.try_claim() {
            tracing::trace!(
                node = %self.name,
                session = %session_id,
                execution = %execution_id,
                "node already running, late input enqueued"
            );
            return Ok(Vec::new());
        }

        let result = self.run_claimed(&session, &instance, &execution_id).await;
        instance.release();
        result
    }

    async fn run_claimed(
        &self,
        session: &Arc<Session>,
        instance: &Arc<NodeInstance>,
        execution_id: &str,
    ) -> Result<Vec<IoRecord>, EngineError> {
        let raw_inputs = instance.queue.get(execution_id).await;
        let execution = session.execution(execution_id);
        let inputs = Inputs::new(raw_inputs);

        let mut routing = RoutingTable::new(&instance.outputs, instance.routing_default);

        let (status, output, failure) = if !inputs.any_succeeded() {
            routing.clear();
            tracing::debug!(node = %self.name, execution = %execution_id, "no predecessor succeeded, skipping");
            (IoStatus::skipped(), not_processed(), None)
        } else {
            let session_handle: Arc<dyn SessionHandle> = session.clone();
            let execution_handle: Arc<dyn nodes::ExecutionHandle> = execution.clone();
            let workflow_handle: Arc<dyn WorkflowHandle> = self.workflow.clone();
            let mut ctx = ExecutorContext {
                inputs,
                routing: &mut routing,
                session: session_handle,
                execution: execution_handle,
                workflow: workflow_handle,
            };
            execution.mark_running(&self.name);
            let outcome = instance.body.execute(&mut ctx).await;
            execution.mark_done(&self.name);
            match outcome {
                Ok(output) => (IoStatus::success(), output, None),
                Err(err) => {
                    routing.clear();
                    tracing::warn!(node = %self.name, execution = %execution_id, error = %err, "node execute failed");
                    (IoStatus::failed(err.to_string()), not_processed(), Some(err))
                }
            }
        };

        let own_source = IoSource::new(session.id(), execution_id, Some(self.name.clone()))
            .expect("session/execution ids were already validated non-empty by the caller");
        let own_io = IoRecord::new(own_source, status.clone(), output.clone());
        execution.record(&self.name, own_io.clone());

        let mut spawned = Vec::with_capacity(instance.outputs.len());
        for successor in &instance.outputs {
            let successor_status = routing
                .status_of(successor)
                .expect("routing table is built from this node's own declared successors");
            let successor_source = IoSource::new(session.id(), execution_id, Some(self.name.clone()))
                .expect("already validated");
            let successor_io = IoRecord::new(
                successor_source,
                IoStatus {
                    execution: successor_status,
                    message: None,
                },
                output.clone(),
            );
            let child = NodeHandle {
                workflow: self.workflow.clone(),
                name: successor.clone(),
            };
            spawned.push((
                successor.clone(),
                tokio::spawn(async move { child.run(successor_io).await }),
            ));
        }

        let mut downstream = Vec::new();
        let mut first_downstream_error = None;
        for (successor, handle) in spawned {
            match handle.await {
                Ok(Ok(ios)) => downstream.extend(ios),
                Ok(Err(err)) => {
                    if first_downstream_error.is_none() {
                        first_downstream_error = Some(err);
                    }
                }
                Err(join_err) => {
                    if first_downstream_error.is_none() {
                        first_downstream_error = Some(EngineError::TaskPanicked {
                            node: successor,
                            message: join_err.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(EngineError::NodeFailed {
                node: self.name.clone(),
                source: err,
            });
        }
        if let Some(err) = first_downstream_error {
            return Err(err);
        }

        if instance.outputs.is_empty() {
            if status.execution == ExecutionStatus::Success {
                Ok(vec![own_io])
            } else {
                Ok(Vec::new())
            }
        } else {
            Ok(downstream)
        }
    }
}
