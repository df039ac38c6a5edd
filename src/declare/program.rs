//! The in-memory program that collects declarations.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use super::resource::{DeclKind, Handle, ResourceDecl, VariableDecl};
use super::value::{references, Symbol};
use crate::error::{Error, Result};
use crate::graph::{DependencyGraph, DependencyType, GraphEdge, GraphNode};

/// Ordered collection of declarations and stack outputs.
///
/// Declarations must be added leaf first: every symbol a declaration
/// references, or explicitly depends on, has to be declared before it.
#[derive(Debug, Clone)]
pub struct Program {
    project: String,
    description: Option<String>,
    resources: IndexMap<String, ResourceDecl>,
    variables: IndexMap<String, VariableDecl>,
    outputs: IndexMap<String, Value>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Program {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            description: None,
            resources: IndexMap::new(),
            variables: IndexMap::new(),
            outputs: IndexMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Adds a resource declaration.
    pub fn declare(&mut self, decl: ResourceDecl) -> Result<Handle> {
        let symbol = self.check_new_symbol(&decl.symbol)?;
        if !decl.properties.is_object() {
            return Err(Error::InvalidProperties(decl.symbol));
        }

        let refs = self.check_references(&decl.symbol, &decl.properties)?;
        for dep in &decl.depends_on {
            if !self.is_declared(dep) {
                return Err(Error::UnknownDependency {
                    from: decl.symbol.clone(),
                    symbol: dep.clone(),
                });
            }
        }

        for dep in &refs {
            self.add_edge(dep, &decl.symbol, DependencyType::Reference);
        }
        for dep in &decl.depends_on {
            self.add_edge(dep, &decl.symbol, DependencyType::Explicit);
        }

        info!(
            symbol = %decl.symbol,
            r#type = %decl.type_token,
            name = %decl.name,
            "Declared resource"
        );

        self.nodes.push(GraphNode::new(
            decl.symbol.clone(),
            decl.name.clone(),
            decl.type_token.clone(),
            DeclKind::Resource,
        ));
        self.resources.insert(decl.symbol.clone(), decl);

        Ok(Handle::new(symbol, DeclKind::Resource))
    }

    /// Adds a function-call variable.
    pub fn declare_variable(&mut self, decl: VariableDecl) -> Result<Handle> {
        let symbol = self.check_new_symbol(&decl.symbol)?;
        if !decl.arguments.is_object() {
            return Err(Error::InvalidProperties(decl.symbol));
        }

        let refs = self.check_references(&decl.symbol, &decl.arguments)?;
        for dep in &refs {
            self.add_edge(dep, &decl.symbol, DependencyType::Reference);
        }

        info!(symbol = %decl.symbol, function = %decl.function, "Declared variable");

        self.nodes.push(GraphNode::new(
            decl.symbol.clone(),
            decl.symbol.clone(),
            decl.function.clone(),
            DeclKind::Variable,
        ));
        self.variables.insert(decl.symbol.clone(), decl);

        Ok(Handle::new(symbol, DeclKind::Variable))
    }

    /// Records a stack output.
    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        let value = value.into();

        if self.outputs.contains_key(&name) {
            return Err(Error::DuplicateDeclaration(format!("outputs.{}", name)));
        }
        self.check_references(&format!("outputs.{}", name), &value)?;

        debug!(output = %name, "Exported stack output");
        self.outputs.insert(name, value);
        Ok(())
    }

    /// Builds the dependency graph of the declarations made so far.
    pub fn graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in &self.nodes {
            graph.add_node(node.clone());
        }
        for edge in &self.edges {
            // both ends were validated on declaration
            let _ = graph.add_dependency(edge.clone());
        }
        graph
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn resources(&self) -> &IndexMap<String, ResourceDecl> {
        &self.resources
    }

    pub fn variables(&self) -> &IndexMap<String, VariableDecl> {
        &self.variables
    }

    pub fn outputs(&self) -> &IndexMap<String, Value> {
        &self.outputs
    }

    pub fn resource(&self, symbol: &str) -> Option<&ResourceDecl> {
        self.resources.get(symbol)
    }

    /// Symbols in declaration order, resources and variables interleaved.
    pub fn declaration_order(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.symbol.as_str())
    }

    /// Number of declarations (resources and variables).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn is_declared(&self, symbol: &str) -> bool {
        self.resources.contains_key(symbol) || self.variables.contains_key(symbol)
    }

    fn check_new_symbol(&self, symbol: &str) -> Result<Symbol> {
        let symbol = Symbol::new(symbol)?;
        if self.is_declared(symbol.as_str()) {
            return Err(Error::DuplicateDeclaration(symbol.to_string()));
        }
        Ok(symbol)
    }

    fn check_references(&self, from: &str, value: &Value) -> Result<Vec<String>> {
        let refs: Vec<String> = references(value).into_iter().collect();
        if let Some(unknown) = refs.iter().find(|r| !self.is_declared(r)) {
            return Err(Error::UnknownReference {
                from: from.to_string(),
                symbol: unknown.clone(),
            });
        }
        Ok(refs)
    }

    fn add_edge(&mut self, from: &str, to: &str, dependency_type: DependencyType) {
        let duplicate = self.edges.iter().any(|e| {
            e.from == from && e.to == to && e.dependency_type == dependency_type
        });
        if !duplicate {
            debug!(from = %from, to = %to, kind = ?dependency_type, "Recorded dependency");
            self.edges.push(GraphEdge::new(from, to, dependency_type));
        }
    }
}
