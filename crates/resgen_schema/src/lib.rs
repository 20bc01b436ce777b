//! Schema type graph for resgen.
//!
//! The graph is built from a GraphQL SDL document and records every named
//! type with its fields, arguments, enum values and union members, along
//! with the root operation types.

pub mod error;
pub mod graph;
pub mod scalars;
pub mod types;

pub use error::SchemaError;
pub use graph::SchemaGraph;
pub use scalars::ScalarMap;
pub use types::*;
