//! `queue` crate — the per-node fan-in synchronizer.
//!
//! Each cloned node owns one [`InputsQueue`]. Predecessors `put` their IO
//! records into it; the node `await`s `get` for the execution id it is
//! currently handling. The queue collapses concurrent, out-of-order arrivals
//! for one `execution_id` into a single release, ordered by the node's
//! declared input-edge order rather than arrival order.

use std::collections::{HashMap, HashSet};

use nodes::{ExecutionStatus, IoRecord};
use tokio::sync::oneshot;

/// Per-execution bookkeeping: which predecessors are still expected, and
/// what has arrived so far.
struct FanIn {
    required: HashSet<String>,
    received: HashMap<String, IoRecord>,
    tx: oneshot::Sender<Vec<IoRecord>>,
}

struct Inner {
    /// In-flight fan-ins, keyed by execution id. An entry exists from the
    /// first `put` for that execution id until the required set is satisfied,
    /// at which point it is removed — letting the *same* execution id be
    /// re-triggered later (the mechanism bounded loops rely on).
    pending: HashMap<String, FanIn>,
    /// Receivers waiting to be claimed by `get`. Created alongside the first
    /// `put` for an execution id (or immediately for an external input) and
    /// removed the moment `get` claims them.
    receivers: HashMap<String, oneshot::Receiver<Vec<IoRecord>>>,
}

/// Declarative contract for one node: its own name (excluded from the
/// required set, so benign self-loops do not deadlock) and the declared
/// order of its input edges (used to sort the released set).
pub struct InputsQueue {
    own_name: String,
    declared_predecessors: Vec<String>,
    inner: parking_lot::Mutex<Inner>,
}

impl InputsQueue {
    pub fn new(own_name: impl Into<String>, declared_predecessors: Vec<String>) -> Self {
        Self {
            own_name: own_name.into(),
            declared_predecessors,
            inner: parking_lot::Mutex::new(Inner {
                pending: HashMap::new(),
                receivers: HashMap::new(),
            }),
        }
    }

    fn sorted(&self, mut received: HashMap<String, IoRecord>) -> Vec<IoRecord> {
        let mut ordered = Vec::with_capacity(received.len());
        for name in &self.declared_predecessors {
            if let Some(record) = received.remove(name) {
                ordered.push(record);
            }
        }
        // Anything left came from a predecessor not in the declared list
        // (should not happen in a well-formed graph); append it rather than
        // silently drop the data.
        ordered.extend(received.into_values());
        ordered
    }

    /// Deliver one IO record from a predecessor (or an external caller).
    pub fn put(&self, io: IoRecord) {
        let execution_id = io.source.execution_id.clone();

        if io.source.origin_node.is_none() {
            // External trigger: always a singleton, always resolved immediately.
            let (tx, rx) = oneshot::channel();
            let mut inner = self.inner.lock();
            inner.receivers.insert(execution_id, rx);
            let _ = tx.send(vec![io]);
            return;
        }

        let predecessor = io.source.predecessor_name().to_string();
        let mut inner = self.inner.lock();

        if !inner.pending.contains_key(&execution_id) {
            let required: HashSet<String> = self
                .declared_predecessors
                .iter()
                .filter(|name| **name != self.own_name)
                .cloned()
                .collect();
            let (tx, rx) = oneshot::channel();
            inner.receivers.insert(execution_id.clone(), rx);
            inner.pending.insert(
                execution_id.clone(),
                FanIn {
                    required,
                    received: HashMap::new(),
                    tx,
                },
            );
        }

        let entry = inner.pending.get_mut(&execution_id).expect("just inserted");
        if io.status.execution != ExecutionStatus::Success {
            entry.required.remove(&predecessor);
        }
        entry.received.insert(predecessor, io);

        let ready = entry.required.iter().all(|name| entry.received.contains_key(name));
        if ready {
            let entry = inner.pending.remove(&execution_id).expect("checked above");
            let ordered = self.sorted(entry.received);
            let _ = entry.tx.send(ordered);
        }
    }

    /// Await the complete, ordered input set for one execution id.
    pub async fn get(&self, execution_id: &str) -> Vec<IoRecord> {
        let rx = {
            let mut inner = self.inner.lock();
            inner.receivers.remove(execution_id)
        };
        match rx {
            Some(rx) => rx.await.unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodes::{IoSource, IoStatus};
    use serde_json::json;

    fn io(session: &str, execution: &str, origin: Option<&str>, status: IoStatus, value: i64) -> IoRecord {
        IoRecord::new(
            IoSource::new(session, execution, origin.map(str::to_string)).unwrap(),
            status,
            json!(value),
        )
    }

    fn preds(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn external_input_resolves_as_singleton() {
        let queue = InputsQueue::new("a", preds(&[]));
        queue.put(io("s1", "e1", None, IoStatus::success(), 7));
        let got = queue.get("e1").await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].output, json!(7));
    }

    #[tokio::test]
    async fn waits_for_all_required_predecessors() {
        let queue = InputsQueue::new("d", preds(&["b", "c"]));
        queue.put(io("s1", "e1", Some("b"), IoStatus::success(), 1));
        // get() would hang here if resolved too early; instead put the second
        // input first, then assert the ordered result.
        queue.put(io("s1", "e1", Some("c"), IoStatus::success(), 2));
        let got = queue.get("e1").await;
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].output, json!(1));
        assert_eq!(got[1].output, json!(2));
    }

    #[tokio::test]
    async fn out_of_order_arrival_still_sorts_by_declared_order() {
        let queue = InputsQueue::new("d", preds(&["b", "c"]));
        queue.put(io("s1", "e1", Some("c"), IoStatus::success(), 2));
        queue.put(io("s1", "e1", Some("b"), IoStatus::success(), 1));
        let got = queue.get("e1").await;
        assert_eq!(got[0].output, json!(1));
        assert_eq!(got[1].output, json!(2));
    }

    #[tokio::test]
    async fn skipped_predecessor_is_absorbed_out_of_required_set() {
        let queue = InputsQueue::new("d", preds(&["b", "c"]));
        queue.put(io("s1", "e1", Some("b"), IoStatus::skipped(), 0));
        let got = queue.get("e1").await;
        assert_eq!(got.len(), 1);
    }

    #[tokio::test]
    async fn resolved_execution_id_can_be_retriggered() {
        let queue = InputsQueue::new("loop", preds(&["loop"]));
        // Self-loop: "loop" is excluded from its own required set, so a
        // single put resolves immediately, each time.
        queue.put(io("s1", "e1", Some("loop"), IoStatus::success(), 1));
        let first = queue.get("e1").await;
        assert_eq!(first[0].output, json!(1));

        queue.put(io("s1", "e1", Some("loop"), IoStatus::success(), 2));
        let second = queue.get("e1").await;
        assert_eq!(second[0].output, json!(2));
    }
}
