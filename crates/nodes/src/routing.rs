use std::collections::HashMap;

use crate::error::NodeError;
use crate::io::ExecutionStatus;

/// Default disposition of successors before the node body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPolicy {
    /// All declared successors start `success`; the body may `skip` some.
    Broadcast,
    /// All declared successors start `skipped`; the body must `add` the ones it wants.
    Clear,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        RoutingPolicy::Broadcast
    }
}

/// Per-execution, per-successor decision about which downstream nodes run.
///
/// Built fresh for every activation from the node's declared outgoing edges
/// and the configured default policy; mutated by the node body; read once at
/// fan-out time and never again.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    statuses: HashMap<String, ExecutionStatus>,
}

impl RoutingTable {
    pub fn new(successors: &[String], policy: RoutingPolicy) -> Self {
        let default = match policy {
            RoutingPolicy::Broadcast => ExecutionStatus::Success,
            RoutingPolicy::Clear => ExecutionStatus::Skipped,
        };
        let statuses = successors
            .iter()
            .map(|name| (name.clone(), default))
            .collect();
        Self { statuses }
    }

    fn require_known(&self, name: &str) -> Result<(), NodeError> {
        if self.statuses.contains_key(name) {
            Ok(())
        } else {
            Err(NodeError::InvalidRouting(name.to_string()))
        }
    }

    pub fn add(&mut self, name: &str) -> Result<(), NodeError> {
        self.require_known(name)?;
        self.statuses.insert(name.to_string(), ExecutionStatus::Success);
        Ok(())
    }

    pub fn add_many<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, names: I) -> Result<(), NodeError> {
        for name in names {
            self.add(name.as_ref())?;
        }
        Ok(())
    }

    pub fn skip(&mut self, name: &str) -> Result<(), NodeError> {
        self.require_known(name)?;
        self.statuses.insert(name.to_string(), ExecutionStatus::Skipped);
        Ok(())
    }

    pub fn skip_many<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, names: I) -> Result<(), NodeError> {
        for name in names {
            self.skip(name.as_ref())?;
        }
        Ok(())
    }

    pub fn broadcast(&mut self) {
        for status in self.statuses.values_mut() {
            *status = ExecutionStatus::Success;
        }
    }

    pub fn clear(&mut self) {
        for status in self.statuses.values_mut() {
            *status = ExecutionStatus::Skipped;
        }
    }

    pub fn status_of(&self, name: &str) -> Option<ExecutionStatus> {
        self.statuses.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ExecutionStatus)> {
        self.statuses.iter().map(|(name, status)| (name.as_str(), *status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn broadcast_defaults_all_success() {
        let table = RoutingTable::new(&names(&["b", "c"]), RoutingPolicy::Broadcast);
        assert_eq!(table.status_of("b"), Some(ExecutionStatus::Success));
        assert_eq!(table.status_of("c"), Some(ExecutionStatus::Success));
    }

    #[test]
    fn clear_defaults_all_skipped() {
        let table = RoutingTable::new(&names(&["b", "c"]), RoutingPolicy::Clear);
        assert_eq!(table.status_of("b"), Some(ExecutionStatus::Skipped));
    }

    #[test]
    fn skip_overrides_broadcast_default() {
        let mut table = RoutingTable::new(&names(&["b", "c"]), RoutingPolicy::Broadcast);
        table.skip("c").unwrap();
        assert_eq!(table.status_of("b"), Some(ExecutionStatus::Success));
        assert_eq!(table.status_of("c"), Some(ExecutionStatus::Skipped));
    }

    #[test]
    fn add_then_clear_last_write_wins() {
        let mut table = RoutingTable::new(&names(&["b", "c"]), RoutingPolicy::Clear);
        table.add("b").unwrap();
        table.clear();
        assert_eq!(table.status_of("b"), Some(ExecutionStatus::Skipped));
    }

    #[test]
    fn unknown_successor_is_rejected() {
        let mut table = RoutingTable::new(&names(&["b"]), RoutingPolicy::Broadcast);
        assert!(matches!(table.add("z"), Err(NodeError::InvalidRouting(_))));
    }
}
