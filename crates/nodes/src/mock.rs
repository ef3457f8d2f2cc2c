//! `MockNode` — a test double for `ExecutableNode`.
//!
//! Useful in unit and integration tests where a real node implementation is
//! either unavailable or irrelevant.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::context::ExecutorContext;
use crate::error::NodeError;
use crate::traits::ExecutableNode;

/// Behaviour injected into `MockNode` at construction time. Shared by the
/// template and every session clone, since it describes *what* the mock does,
/// not its per-session state.
#[derive(Clone)]
pub enum MockBehaviour {
    /// Return a specific JSON value.
    ReturnValue(Value),
    /// Compute the output from the gathered successful inputs.
    SumInputsPlusOne,
    /// Fail with the given message.
    Fail(String),
}

/// A mock node that records every activation it receives and returns a
/// programmer-specified result. `new_instance` resets the call log, matching
/// the template/clone split every real node goes through.
pub struct MockNode {
    pub name: String,
    pub behaviour: MockBehaviour,
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    pub fn returning(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::ReturnValue(value),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn summing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::SumInputsPlusOne,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Fail(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ExecutableNode for MockNode {
    async fn execute(&self, ctx: &mut ExecutorContext<'_>) -> Result<Value, NodeError> {
        let snapshot = Value::Array(ctx.inputs.outputs().into_iter().cloned().collect());
        self.calls.lock().push(snapshot.clone());

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::SumInputsPlusOne => {
                let sum: f64 = ctx
                    .inputs
                    .outputs()
                    .into_iter()
                    .filter_map(|v| v.as_f64())
                    .sum();
                Ok(Value::from(sum + 1.0))
            }
            MockBehaviour::Fail(msg) => Err(NodeError::Failed(msg.clone())),
        }
    }

    fn new_instance(&self) -> Box<dyn ExecutableNode> {
        Box::new(MockNode {
            name: self.name.clone(),
            behaviour: self.behaviour.clone(),
            calls: Arc::new(Mutex::new(Vec::new())),
        })
    }
}
