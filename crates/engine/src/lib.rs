//! `engine` crate — the Node/Workflow/Session/Execution orchestration layer.
//!
//! This crate owns *scheduling*: fan-in synchronization (via the `queue`
//! crate), routing, session cloning, execution bookkeeping, and TTL-based
//! reaping. It knows nothing about what a node body actually computes — that
//! vocabulary (`ExecutableNode`, `IoRecord`, `RoutingTable`, ...) lives in the
//! `nodes` crate, which this crate depends on and never the reverse.

pub mod config;
pub mod error;
pub mod execution;
pub mod node;
pub mod plot;
pub mod session;
pub mod workflow;

pub use config::{NodeConfig, WorkflowConfig};
pub use error::EngineError;
pub use execution::Execution;
pub use node::{NodeHandle, NodeTemplate};
pub use plot::{GraphSnapshot, NodeSnapshot};
pub use session::Session;
pub use workflow::Workflow;

// Re-exported so downstream crates (the `cli`, and node-body authors) can
// build graphs against `engine::{ExecutableNode, IoRecord, ...}` without a
// direct `nodes` dependency of their own.
pub use nodes::{
    ExecutableNode, ExecutionStatus, ExecutorContext, IoRecord, IoSource, IoStatus, NodeError,
    RoutingPolicy, EXTERNAL_INPUT,
};
