//! TypeScript symbol extraction for resgen.
//!
//! This crate provides:
//! - `declarations`: Top-level interfaces and type aliases of a module
//! - `extract`: Symbol lookup in model files

pub mod declarations;
pub mod extract;

pub use declarations::{parse_declarations, ParsedModule, SyntaxError};
pub use extract::{
    declared_symbols, extract_from_source, extract_symbol, DeclarationKind, DeclaredShape,
    ExtractError, ShapeMember, SymbolLookup,
};
