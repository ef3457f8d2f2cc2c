//! Node-level error type.

use thiserror::Error;

/// Errors a node body, or the context it is handed, can raise during one activation.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// The user body returned an error; the engine records `failed` and re-raises.
    #[error("node execution failed: {0}")]
    Failed(String),

    /// `routing.add`/`routing.skip` referenced a name that is not a declared successor.
    #[error("invalid routing target: {0}")]
    InvalidRouting(String),

    /// `ctx.inputs.get` referenced a name that is not a declared predecessor.
    #[error("input not found: {0}")]
    InputNotFound(String),

    /// A session or execution identifier was empty.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
