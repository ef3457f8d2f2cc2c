use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name reserved for the implicit predecessor of an externally supplied input.
pub const EXTERNAL_INPUT: &str = "__input__";

/// Outcome of one node activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Skipped,
    Failed,
}

impl ExecutionStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Status carried alongside an IO record: the outcome plus an optional message
/// (populated when a node fails, so the reason travels with the skip/fail downstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoStatus {
    pub execution: ExecutionStatus,
    pub message: Option<String>,
}

impl IoStatus {
    pub fn success() -> Self {
        Self {
            execution: ExecutionStatus::Success,
            message: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            execution: ExecutionStatus::Skipped,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            execution: ExecutionStatus::Failed,
            message: Some(message.into()),
        }
    }
}

/// Where an IO record came from: which session, which execution, and which
/// node produced it (absent for externally supplied inputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoSource {
    pub session_id: String,
    pub execution_id: String,
    pub origin_node: Option<String>,
}

impl IoSource {
    pub fn new(
        session_id: impl Into<String>,
        execution_id: impl Into<String>,
        origin_node: Option<String>,
    ) -> Result<Self, crate::error::NodeError> {
        let session_id = session_id.into();
        let execution_id = execution_id.into();
        if session_id.is_empty() || execution_id.is_empty() {
            return Err(crate::error::NodeError::InvalidIdentifier(
                "session_id and execution_id must be non-empty".to_string(),
            ));
        }
        Ok(Self {
            session_id,
            execution_id,
            origin_node,
        })
    }

    pub fn external(session_id: impl Into<String>, execution_id: impl Into<String>) -> Result<Self, crate::error::NodeError> {
        Self::new(session_id, execution_id, None)
    }

    pub fn predecessor_name(&self) -> &str {
        self.origin_node.as_deref().unwrap_or(EXTERNAL_INPUT)
    }
}

/// One unit of data flowing along an edge: where it came from, what happened
/// producing it, and the value itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoRecord {
    pub source: IoSource,
    pub status: IoStatus,
    pub output: Value,
}

impl IoRecord {
    pub fn new(source: IoSource, status: IoStatus, output: Value) -> Self {
        Self {
            source,
            status,
            output,
        }
    }
}

/// Marker value distinguishable from a legitimate `null` output: what a
/// skipped node "produces" in place of calling the user body.
pub fn not_processed() -> Value {
    serde_json::json!({ "__not_processed__": true })
}

pub fn is_not_processed(value: &Value) -> bool {
    value
        .get("__not_processed__")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
