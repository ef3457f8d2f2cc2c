//! Diagnostic snapshot of a workflow's registered topology.
//!
//! Purely introspective: nothing here is consulted by the dispatch path in
//! `node.rs`. A `GraphSnapshot` is a plain data structure; the DOT renderer
//! is one possible consumer, not a hard dependency of the engine (no
//! graphviz crate in `Cargo.toml`).

use indexmap::IndexMap;
use std::fmt::Write as _;
use std::sync::Arc;

use nodes::RoutingPolicy;

use crate::node::NodeTemplate;

/// One node as it appears in the registered (template) topology.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub name: String,
    pub routing_default_policy: RoutingPolicy,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// The whole registered topology, in registration order.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
    pub(crate) fn from_templates(templates: &IndexMap<String, Arc<NodeTemplate>>) -> Self {
        let nodes = templates
            .values()
            .map(|template| NodeSnapshot {
                name: template.name.clone(),
                routing_default_policy: template.config.routing_default_policy,
                inputs: template.inputs(),
                outputs: template.outputs(),
            })
            .collect();
        Self { nodes }
    }

    /// Declared edges as `(from, to)` pairs, in fan-out declaration order.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .flat_map(|node| node.outputs.iter().map(move |to| (node.name.clone(), to.clone())))
            .collect()
    }

    /// Render as a Graphviz DOT digraph, for piping into `dot -Tpng`.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph workflow {\n");
        for node in &self.nodes {
            let shape = match node.routing_default_policy {
                RoutingPolicy::Broadcast => "ellipse",
                RoutingPolicy::Clear => "box",
            };
            let _ = writeln!(out, "  \"{}\" [shape={shape}];", node.name);
        }
        for (from, to) in self.edges() {
            let _ = writeln!(out, "  \"{from}\" -> \"{to}\";");
        }
        out.push('}');
        out
    }
}
