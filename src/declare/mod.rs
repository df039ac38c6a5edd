//! Declaration model.
//!
//! A [`Program`] collects [`ResourceDecl`]s and [`VariableDecl`]s in leaf-first
//! order. Declarations consume each other's outputs only through
//! [`OutputRef`]s obtained from a [`Handle`], and every such reference becomes
//! an edge of the dependency graph.

mod program;
mod resource;
mod value;

pub use program::Program;
pub use resource::{types, DeclKind, Handle, ResourceDecl, VariableDecl};
pub use value::{escape_literal, literal, references, secret, OutputRef, Symbol};
