//! Symbol extraction from TypeScript model files.

use crate::declarations::{parse_declarations, ParsedModule};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a model file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a shape was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Interface,
    TypeAlias,
}

/// A named member of a declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMember {
    pub name: String,
    pub type_text: String,
    pub optional: bool,
}

/// The declared shape of a top-level symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredShape {
    pub name: String,
    pub kind: DeclarationKind,
    pub members: Vec<ShapeMember>,
    pub exported: bool,
    /// File the symbol was found in.
    pub path: PathBuf,
}

impl DeclaredShape {
    /// Returns the member with the given name.
    pub fn member(&self, name: &str) -> Option<&ShapeMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Outcome of looking a symbol up in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolLookup {
    Found(DeclaredShape),
    NotFound,
}

impl SymbolLookup {
    pub fn found(self) -> Option<DeclaredShape> {
        match self {
            Self::Found(shape) => Some(shape),
            Self::NotFound => None,
        }
    }
}

fn read_source(path: &Path) -> Result<String, ExtractError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ExtractError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ExtractError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Finds the first top-level interface or type alias named `symbol` in the
/// file at `path`.
pub fn extract_symbol(path: &Path, symbol: &str) -> Result<SymbolLookup, ExtractError> {
    let source = read_source(path)?;
    Ok(extract_from_source(&source, path, symbol))
}

/// Like [`extract_symbol`], over source text already in memory.
///
/// A file that does not parse has no symbols; the failure is logged.
pub fn extract_from_source(source: &str, path: &Path, symbol: &str) -> SymbolLookup {
    let mut module = parse(source, path);
    match module.declarations.iter().position(|d| d.name == symbol) {
        Some(index) => SymbolLookup::Found(module.declarations.swap_remove(index)),
        None => SymbolLookup::NotFound,
    }
}

/// Lists the names of all top-level interface and type alias declarations,
/// in source order.
pub fn declared_symbols(path: &Path) -> Result<Vec<String>, ExtractError> {
    let source = read_source(path)?;
    Ok(parse(&source, path)
        .declarations
        .into_iter()
        .map(|d| d.name)
        .collect())
}

fn parse(source: &str, path: &Path) -> ParsedModule {
    let module = parse_declarations(source, path);
    if let Some(first) = module.errors.first() {
        if module.complete {
            tracing::debug!(
                path = %path.display(),
                errors = module.errors.len(),
                line = first.line,
                column = first.column,
                message = %first.message,
                "model file has recoverable syntax errors"
            );
        } else if let Some(fatal) = module.errors.last() {
            tracing::warn!(
                path = %path.display(),
                line = fatal.line,
                column = fatal.column,
                message = %fatal.message,
                "model file does not parse; no symbols read from it"
            );
        }
    }
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: &str = r#"
import { Db } from "./db"

export interface User {
  id: string
  name?: string
  friends(first: number): User[]
}

export type Post = {
  title: string;
}

type Alias = User | Post
"#;

    #[test]
    fn test_extract_interface() {
        let path = Path::new("models.ts");
        let shape = extract_from_source(MODELS, path, "User").found().unwrap();
        assert_eq!(shape.kind, DeclarationKind::Interface);
        assert!(shape.exported);
        assert_eq!(shape.path, path);
        assert_eq!(shape.members.len(), 3);
        assert!(shape.member("name").unwrap().optional);
        assert_eq!(
            shape.member("friends").unwrap().type_text,
            "(first: number) => User[]"
        );
    }

    #[test]
    fn test_extract_type_alias() {
        let shape = extract_from_source(MODELS, Path::new("m.ts"), "Post")
            .found()
            .unwrap();
        assert_eq!(shape.kind, DeclarationKind::TypeAlias);
        assert_eq!(shape.member("title").unwrap().type_text, "string");

        let alias = extract_from_source(MODELS, Path::new("m.ts"), "Alias")
            .found()
            .unwrap();
        assert!(alias.members.is_empty());
        assert!(!alias.exported);
    }

    #[test]
    fn test_missing_symbol() {
        assert_eq!(
            extract_from_source(MODELS, Path::new("m.ts"), "Db"),
            SymbolLookup::NotFound
        );
    }

    #[test]
    fn test_declared_symbols_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.ts");
        std::fs::write(&path, MODELS).unwrap();

        assert_eq!(declared_symbols(&path).unwrap(), vec!["User", "Post", "Alias"]);
        assert!(extract_symbol(&path, "Post").unwrap().found().is_some());
    }

    #[test]
    fn test_unparseable_file_has_no_symbols() {
        let source = "export interface User {\n  id: string\n";
        assert_eq!(
            extract_from_source(source, Path::new("m.ts"), "User"),
            SymbolLookup::NotFound
        );
    }

    #[test]
    fn test_regex_literal_before_declaration() {
        let source = "const re = /{/\nexport interface User { id: string }";
        let shape = extract_from_source(source, Path::new("m.ts"), "User")
            .found()
            .unwrap();
        assert_eq!(shape.member("id").unwrap().type_text, "string");
    }

    #[test]
    fn test_missing_file() {
        let err = extract_symbol(Path::new("/definitely/not/here.ts"), "User").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }
}
