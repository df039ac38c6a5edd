//! Declaration Dependency Graph
//!
//! Tracks the dependencies between the declarations of a program:
//!
//! - Implicit edges, from an output reference inside properties
//! - Explicit edges, from `dependsOn`
//!
//! The engine schedules from the same information; this graph exists so the
//! ordering can be inspected, exported and tested before anything is applied.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::declare::DeclKind;
use crate::error::{Error, Result};

/// A node in the dependency graph representing one declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Program symbol
    pub symbol: String,
    /// Logical resource name
    pub name: String,
    /// Type token (or function token for variables)
    pub type_token: String,
    /// Resource or variable
    pub kind: DeclKind,
    /// Declaration sequence number
    pub sequence: usize,
}

impl GraphNode {
    /// Create a new graph node
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        type_token: impl Into<String>,
        kind: DeclKind,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            type_token: type_token.into(),
            kind,
            sequence: 0,
        }
    }
}

/// Type of dependency between declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Output of one declaration used as input of another
    Reference,
    /// `dependsOn` ordering
    Explicit,
}

/// An edge: `to` depends on `from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub dependency_type: DependencyType,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, dep: DependencyType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            dependency_type: dep,
        }
    }
}

/// The dependency graph for a program
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing an existing node with the same symbol
    pub fn add_node(&mut self, mut node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&node.symbol) {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                node.sequence = existing.sequence;
                *existing = node;
            }
            return idx;
        }

        node.sequence = self.graph.node_count();
        let symbol = node.symbol.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(symbol, idx);
        idx
    }

    /// Add an edge. A second edge of the same kind between the same pair is ignored.
    pub fn add_dependency(&mut self, edge: GraphEdge) -> Result<()> {
        let from_idx = *self
            .node_indices
            .get(&edge.from)
            .ok_or_else(|| Error::NodeNotFound(edge.from.clone()))?;
        let to_idx = *self
            .node_indices
            .get(&edge.to)
            .ok_or_else(|| Error::NodeNotFound(edge.to.clone()))?;

        let exists = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|e| e.weight().dependency_type == edge.dependency_type);
        if !exists {
            self.graph.add_edge(from_idx, to_idx, edge);
        }
        Ok(())
    }

    /// Check for dependency cycles
    pub fn has_cycles(&self) -> bool {
        !self.cycles().is_empty()
    }

    /// Get all cycles in the graph (self-loops included)
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&idx| self.graph.contains_edge(idx, idx))
            })
            .map(|scc| {
                scc.into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).map(|n| n.symbol.clone()))
                    .collect()
            })
            .collect()
    }

    /// Topological order. Ties keep declaration order.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| (idx, self.incoming(idx).len()))
            .collect();

        let mut ready: BinaryHeap<Reverse<(usize, NodeIndex)>> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&idx, _)| Reverse((self.sequence(idx), idx)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, idx))) = ready.pop() {
            if let Some(node) = self.graph.node_weight(idx) {
                order.push(node.symbol.clone());
            }
            for next in self.outgoing(idx) {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse((self.sequence(next), next)));
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            let cycles = self
                .cycles()
                .iter()
                .map(|c| c.join(" -> "))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::DependencyCycle(cycles));
        }

        Ok(order)
    }

    /// Groups declarations into waves. Every member of a wave depends only on
    /// members of earlier waves, so a wave can be applied concurrently.
    pub fn parallel_levels(&self) -> Result<Vec<Vec<String>>> {
        let order = self.execution_order()?;
        let mut level_of: HashMap<NodeIndex, usize> = HashMap::new();
        let mut levels: Vec<Vec<String>> = Vec::new();

        for symbol in order {
            let Some(&idx) = self.node_indices.get(&symbol) else {
                continue;
            };
            let level = self
                .incoming(idx)
                .iter()
                .filter_map(|dep| level_of.get(dep))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            level_of.insert(idx, level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(symbol);
        }

        Ok(levels)
    }

    /// Get every declaration that depends on `symbol` (direct and transitive)
    pub fn dependents(&self, symbol: &str) -> Vec<String> {
        self.walk(symbol, Direction::Outgoing)
    }

    /// Get every declaration `symbol` depends on (direct and transitive)
    pub fn dependencies(&self, symbol: &str) -> Vec<String> {
        self.walk(symbol, Direction::Incoming)
    }

    /// Get the symbols `symbol` depends on directly, in declaration order
    pub fn direct_dependencies(&self, symbol: &str) -> Vec<String> {
        match self.node_indices.get(symbol) {
            Some(&idx) => self.symbols_sorted(self.incoming(idx)),
            None => Vec::new(),
        }
    }

    /// Get the edges pointing at `symbol`
    pub fn incoming_edges(&self, symbol: &str) -> Vec<GraphEdge> {
        match self.node_indices.get(symbol) {
            Some(&idx) => self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| e.weight().clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get a node by symbol
    pub fn node(&self, symbol: &str) -> Option<&GraphNode> {
        self.node_indices
            .get(symbol)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Generate a DOT format representation for visualization
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph declarations {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box];\n\n");

        let mut nodes: Vec<&GraphNode> = self.graph.node_weights().collect();
        nodes.sort_by_key(|n| n.sequence);
        for node in nodes {
            let shape = match node.kind {
                DeclKind::Resource => "box",
                DeclKind::Variable => "ellipse",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\", shape={}];\n",
                node.symbol, node.name, node.type_token, shape
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            let dep = edge.weight();
            let style = match dep.dependency_type {
                DependencyType::Reference => "solid",
                DependencyType::Explicit => "dashed",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [style={}];\n",
                dep.from, dep.to, style
            ));
        }

        output.push_str("}\n");
        output
    }

    fn sequence(&self, idx: NodeIndex) -> usize {
        self.graph.node_weight(idx).map(|n| n.sequence).unwrap_or(usize::MAX)
    }

    fn incoming(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Incoming)
    }

    fn outgoing(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Outgoing)
    }

    // Distinct neighbors; parallel edges of different kinds count once.
    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.graph
            .neighbors_directed(idx, direction)
            .filter(|n| seen.insert(*n))
            .collect()
    }

    fn symbols_sorted(&self, indices: Vec<NodeIndex>) -> Vec<String> {
        let mut nodes: Vec<&GraphNode> = indices
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect();
        nodes.sort_by_key(|n| n.sequence);
        nodes.into_iter().map(|n| n.symbol.clone()).collect()
    }

    fn walk(&self, symbol: &str, direction: Direction) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_indices.get(symbol) {
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors_directed(current, direction) {
                    if neighbor != start && visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        self.symbols_sorted(visited.into_iter().collect())
    }
}
