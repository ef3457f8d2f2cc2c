//! `rusty-dag-engine` CLI — a thin demonstration/ops harness over the
//! `engine` crate.
//!
//! Subcommands:
//! - `run-demo <scenario>` — build one of the canonical scenario graphs,
//!   trigger it once, and print the terminal IO records returned.
//! - `plot <scenario>`     — print a Graphviz DOT snapshot of a scenario
//!   graph's registered topology, without triggering it.
//!
//! This crate carries no HTTP surface, no database, and no queue worker: the
//! engine is an in-process library, not a service.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;

use engine::{
    EngineError, ExecutableNode, ExecutorContext, IoSource, IoStatus, NodeConfig, NodeError,
    NodeHandle, RoutingPolicy, Workflow, WorkflowConfig,
};
use nodes::mock::MockNode;

#[derive(Parser)]
#[command(name = "rusty-dag-engine", about = "Concurrent dataflow execution engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a scenario graph, trigger it once, and print the terminal IOs.
    RunDemo {
        #[arg(value_enum, default_value_t = Scenario::Diamond)]
        scenario: Scenario,
        #[arg(long, default_value = "cli-session")]
        session_id: String,
        #[arg(long, default_value = "cli-execution")]
        execution_id: String,
    },
    /// Print a Graphviz DOT snapshot of a scenario graph's topology.
    Plot {
        #[arg(value_enum, default_value_t = Scenario::Diamond)]
        scenario: Scenario,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    /// A → B, A → C, B → D, C → D; broadcast routing; node body sums inputs+1.
    Diamond,
    /// A → B, A → C; A explicitly skips C via routing.
    Routing,
    /// A → B → C; A fails, B and C are driven to skip.
    Failure,
}

/// A node body that skips a single named successor, broadcasting to the
/// rest. Used only by the `routing` demo scenario — real graphs express this
/// kind of conditional fan-out in their own `execute` bodies.
struct SkipSuccessorNode {
    name: String,
    skip: String,
}

#[async_trait]
impl ExecutableNode for SkipSuccessorNode {
    async fn execute(&self, ctx: &mut ExecutorContext<'_>) -> Result<Value, NodeError> {
        ctx.routing.skip(&self.skip)?;
        Ok(Value::from(1))
    }

    fn new_instance(&self) -> Box<dyn ExecutableNode> {
        Box::new(SkipSuccessorNode {
            name: self.name.clone(),
            skip: self.skip.clone(),
        })
    }
}

fn build_diamond(workflow: &Arc<Workflow>) -> Result<NodeHandle, EngineError> {
    let a = workflow.register("a", Arc::new(MockNode::summing("a")), NodeConfig::default())?;
    let b = workflow.register("b", Arc::new(MockNode::summing("b")), NodeConfig::default())?;
    let c = workflow.register("c", Arc::new(MockNode::summing("c")), NodeConfig::default())?;
    let d = workflow.register("d", Arc::new(MockNode::summing("d")), NodeConfig::default())?;
    a.connect(&b)?;
    a.connect(&c)?;
    b.connect(&d)?;
    c.connect(&d)?;
    Ok(a)
}

fn build_routing(workflow: &Arc<Workflow>) -> Result<NodeHandle, EngineError> {
    let body = Arc::new(SkipSuccessorNode {
        name: "a".to_string(),
        skip: "c".to_string(),
    });
    let a = workflow.register("a", body, NodeConfig::default().with_routing_default(RoutingPolicy::Broadcast))?;
    let b = workflow.register("b", Arc::new(MockNode::summing("b")), NodeConfig::default())?;
    let c = workflow.register("c", Arc::new(MockNode::summing("c")), NodeConfig::default())?;
    a.connect(&b)?;
    a.connect(&c)?;
    Ok(a)
}

fn build_failure(workflow: &Arc<Workflow>) -> Result<NodeHandle, EngineError> {
    let a = workflow.register("a", Arc::new(MockNode::failing("a", "demo failure")), NodeConfig::default())?;
    let b = workflow.register("b", Arc::new(MockNode::summing("b")), NodeConfig::default())?;
    let c = workflow.register("c", Arc::new(MockNode::summing("c")), NodeConfig::default())?;
    a.connect(&b)?;
    b.connect(&c)?;
    Ok(a)
}

fn build_scenario(workflow: &Arc<Workflow>, scenario: Scenario) -> Result<NodeHandle, EngineError> {
    match scenario {
        Scenario::Diamond => build_diamond(workflow),
        Scenario::Routing => build_routing(workflow),
        Scenario::Failure => build_failure(workflow),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::RunDemo {
            scenario,
            session_id,
            execution_id,
        } => {
            let workflow = Workflow::new(WorkflowConfig::default());
            let entry = build_scenario(&workflow, scenario).expect("scenario graph is well-formed");

            let source = IoSource::external(session_id.clone(), execution_id.clone())
                .expect("session_id and execution_id are non-empty literals");
            info!(session = %session_id, execution = %execution_id, "triggering demo graph");

            match entry.run(engine::IoRecord::new(source, IoStatus::success(), Value::from(1))).await {
                Ok(terminal) => {
                    println!("terminal outputs ({}):", terminal.len());
                    for io in terminal {
                        println!(
                            "  {} = {} ({:?})",
                            io.source.origin_node.as_deref().unwrap_or("?"),
                            io.output,
                            io.status.execution
                        );
                    }
                }
                Err(err) => {
                    eprintln!("demo graph run failed: {err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Plot { scenario } => {
            let workflow = Workflow::new(WorkflowConfig::default());
            build_scenario(&workflow, scenario).expect("scenario graph is well-formed");
            println!("{}", workflow.plot().to_dot());
        }
    }
}
