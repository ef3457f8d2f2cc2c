use std::sync::Arc;

use crate::handles::{ExecutionHandle, SessionHandle, WorkflowHandle};
use crate::inputs::Inputs;
use crate::routing::RoutingTable;

/// Everything a node body sees during one activation: the gathered inputs,
/// a mutable routing table it may override, and handles onto its session,
/// the current execution, and the owning workflow.
pub struct ExecutorContext<'a> {
    pub inputs: Inputs,
    pub routing: &'a mut RoutingTable,
    pub session: Arc<dyn SessionHandle>,
    pub execution: Arc<dyn ExecutionHandle>,
    pub workflow: Arc<dyn WorkflowHandle>,
}

impl<'a> ExecutorContext<'a> {
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    pub fn execution_id(&self) -> &str {
        self.execution.id()
    }
}
