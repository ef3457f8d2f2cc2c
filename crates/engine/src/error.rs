//! Engine-level error type.

use thiserror::Error;

use nodes::NodeError;

/// Errors produced by the Workflow/Node orchestration layer.
///
/// `NodeError` (the `nodes` crate's error type) covers what goes wrong
/// *inside* a node body's `execute`; `EngineError` covers what goes wrong in
/// the orchestration around it — registration, topology, and dispatch.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two templates registered under the same name.
    #[error("duplicate node name: '{0}'")]
    DuplicateName(String),

    /// `register`/`connect` called after the first trigger anywhere in the
    /// workflow dispatched.
    #[error("workflow topology is frozen after the first trigger")]
    TopologyFrozen,

    /// A name was looked up in the template or session node map and was not
    /// found. Not user-visible in a well-formed graph.
    #[error("unknown node: '{0}'")]
    UnknownNode(String),

    /// A node body's `execute` returned an error. The engine has already
    /// recorded the node `failed` and force-cleared its routing; this is the
    /// re-raise at the top-level `run`.
    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: NodeError,
    },

    /// A successor task panicked instead of returning normally.
    #[error("successor task for node '{node}' panicked: {message}")]
    TaskPanicked { node: String, message: String },
}
