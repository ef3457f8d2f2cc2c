//! `nodes` crate — the vocabulary shared by node bodies and the engine.
//!
//! This crate knows nothing about sessions, DAGs, or scheduling; it defines
//! the data that flows along edges (`IoRecord`), the routing contract a node
//! body can mutate (`RoutingTable`), the context a body is handed
//! (`ExecutorContext`), and the trait it implements (`ExecutableNode`). The
//! `engine` crate depends on this one, never the other way around.

pub mod context;
pub mod error;
pub mod handles;
pub mod inputs;
pub mod io;
pub mod memory;
pub mod mock;
pub mod routing;
pub mod traits;

pub use context::ExecutorContext;
pub use error::NodeError;
pub use handles::{ExecutionHandle, SessionHandle, WorkflowHandle};
pub use inputs::Inputs;
pub use io::{is_not_processed, not_processed, ExecutionStatus, IoRecord, IoSource, IoStatus, EXTERNAL_INPUT};
pub use memory::SessionMemory;
pub use routing::{RoutingPolicy, RoutingTable};
pub use traits::ExecutableNode;
