//! Graph command
//!
//! Prints the declaration order of the stack, its parallel waves, or the
//! dependency graph in DOT format.

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use edgestack::components::declare_stack;
use serde::Serialize;

/// Arguments for the graph command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Print the graph in Graphviz DOT format
    #[arg(long, conflicts_with = "levels")]
    pub dot: bool,

    /// Group declarations into waves that can be applied together
    #[arg(long)]
    pub levels: bool,
}

#[derive(Debug, Serialize)]
struct OrderEntry {
    symbol: String,
    name: String,
    #[serde(rename = "type")]
    type_token: String,
    #[serde(rename = "dependsOn")]
    depends_on: Vec<String>,
}

impl GraphArgs {
    /// Execute the graph command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inputs = ctx.load_inputs(None).await?;
        let stack = declare_stack(&inputs)?;
        let graph = stack.program.graph();

        if self.dot {
            print!("{}", graph.to_dot());
            return Ok(0);
        }

        if self.levels {
            let levels = graph.parallel_levels()?;
            if ctx.output.is_structured() {
                ctx.output.emit(&levels)?;
            } else {
                for (i, level) in levels.iter().enumerate() {
                    println!("{:>2}: {}", i, level.join(", "));
                }
            }
            return Ok(0);
        }

        let entries: Vec<OrderEntry> = graph
            .execution_order()?
            .into_iter()
            .filter_map(|symbol| {
                let node = graph.node(&symbol)?;
                Some(OrderEntry {
                    depends_on: graph.direct_dependencies(&symbol),
                    name: node.name.clone(),
                    type_token: node.type_token.clone(),
                    symbol,
                })
            })
            .collect();

        if ctx.output.is_structured() {
            ctx.output.emit(&entries)?;
            return Ok(0);
        }

        ctx.output.banner(&format!(
            "DECLARATION ORDER [{}/{}]",
            inputs.common.project, inputs.common.environment
        ));
        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                vec![
                    (i + 1).to_string(),
                    e.symbol.clone(),
                    e.type_token.clone(),
                    e.depends_on.join(", "),
                ]
            })
            .collect();
        ctx.output.table(&["#", "symbol", "type", "depends on"], &rows);
        println!(
            "\n{} declarations, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(0)
    }
}

#[async_trait::async_trait]
impl Runnable for GraphArgs {
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_args_conflict() {
        assert!(GraphArgs::try_parse_from(["graph", "--dot"]).unwrap().dot);
        assert!(GraphArgs::try_parse_from(["graph", "--dot", "--levels"]).is_err());
    }
}
