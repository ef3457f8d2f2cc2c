use std::time::Duration;

use parking_lot::Mutex;

use crate::io::IoRecord;
use crate::memory::SessionMemory;

/// Seam implemented by `engine::Session`, exposed to node bodies without
/// giving the `nodes` crate a dependency on `engine` (which depends on `nodes`).
pub trait SessionHandle: Send + Sync {
    fn id(&self) -> &str;
    fn memory(&self) -> &Mutex<SessionMemory>;
}

/// Seam implemented by `engine::Execution`.
pub trait ExecutionHandle: Send + Sync {
    fn id(&self) -> &str;
    fn get(&self, node_name: &str) -> Option<IoRecord>;
}

/// Seam implemented by `engine::Workflow`.
pub trait WorkflowHandle: Send + Sync {
    fn session_ttl(&self) -> Option<Duration>;
}
