//! One trigger's worth of per-node outputs within one session.

use std::collections::HashSet;

use indexmap::IndexMap;
use parking_lot::Mutex;

use nodes::{ExecutionHandle, IoRecord};

/// All IO records produced, across every node reached, for one
/// `(session_id, execution_id)` pair.
///
/// Append-only during its lifetime: writes are keyed by node name, reads are
/// by name in insertion order. At most one record per node is the steady
/// state; a loop body re-entering the same execution id overwrites its own
/// prior record (logged, not rejected).
pub struct Execution {
    id: String,
    records: Mutex<IndexMap<String, IoRecord>>,
    running: Mutex<HashSet<String>>,
}

impl Execution {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            records: Mutex::new(IndexMap::new()),
            running: Mutex::new(HashSet::new()),
        }
    }

    /// Store this node's IO record, warning rather than failing if one
    /// already exists for this node in this execution (the mechanism loop
    /// bodies rely on).
    pub fn record(&self, node_name: &str, io: IoRecord) {
        let mut records = self.records.lock();
        if records.contains_key(node_name) {
            tracing::warn!(
                node = node_name,
                execution = %self.id,
                "overwriting prior execution record for this node"
            );
        }
        records.insert(node_name.to_string(), io);
    }

    pub fn mark_running(&self, node_name: &str) {
        self.running.lock().insert(node_name.to_string());
    }

    pub fn mark_done(&self, node_name: &str) {
        self.running.lock().remove(node_name);
    }

    /// Node names currently inside `execute` for this execution. A
    /// best-effort debug aid — correctness comes from each node's own
    /// `running` flag, not from this set.
    pub fn running_nodes(&self) -> Vec<String> {
        self.running.lock().iter().cloned().collect()
    }

    /// All records, in insertion order.
    pub fn records(&self) -> Vec<(String, IoRecord)> {
        self.records
            .lock()
            .iter()
            .map(|(name, io)| (name.clone(), io.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ExecutionHandle for Execution {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, node_name: &str) -> Option<IoRecord> {
        self.records.lock().get(node_name).cloned()
    }
}
