use serde_json::Value;

use crate::error::NodeError;
use crate::io::IoRecord;

/// The ordered set of IO records gathered for one activation, already sorted
/// by declared input-edge order (not arrival order).
#[derive(Debug, Clone)]
pub struct Inputs {
    records: Vec<IoRecord>,
}

impl Inputs {
    pub fn new(records: Vec<IoRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, predecessor: &str) -> Result<&IoRecord, NodeError> {
        self.records
            .iter()
            .find(|r| r.source.predecessor_name() == predecessor)
            .ok_or_else(|| NodeError::InputNotFound(predecessor.to_string()))
    }

    /// All records, in declaration order, regardless of status.
    pub fn iter(&self) -> impl Iterator<Item = &IoRecord> {
        self.records.iter()
    }

    /// The output values of predecessors that succeeded, in declaration order.
    pub fn outputs(&self) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| r.status.execution.is_success())
            .map(|r| &r.output)
            .collect()
    }

    pub fn any_succeeded(&self) -> bool {
        self.records.iter().any(|r| r.status.execution.is_success())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
