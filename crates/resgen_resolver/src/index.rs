//! First-declaration-wins index of model symbols.

use crate::reference::{ModelBinding, ModelReference};
use crate::ResolveError;
use indexmap::IndexMap;
use rayon::prelude::*;
use resgen_schema::SchemaGraph;
use std::path::{Path, PathBuf};

/// Maps symbol names to the first model file declaring them.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: IndexMap<String, PathBuf>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from model files, in the given order.
    ///
    /// Files are read in parallel but folded in order, so a symbol declared
    /// in several files always maps to the earliest one.
    pub fn build(files: &[PathBuf]) -> Result<Self, ResolveError> {
        let declarations = files
            .par_iter()
            .map(|file| {
                resgen_syntax::declared_symbols(file).map(|symbols| (file.clone(), symbols))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut index = Self::new();
        for (file, symbols) in declarations {
            index.insert_all(&file, symbols);
        }
        Ok(index)
    }

    /// Adds the symbols declared in `file`. Names already indexed are kept.
    pub fn insert_all(&mut self, file: &Path, symbols: impl IntoIterator<Item = String>) {
        for symbol in symbols {
            match self.symbols.get(&symbol) {
                Some(existing) => {
                    tracing::debug!(
                        %symbol,
                        kept = %existing.display(),
                        shadowed = %file.display(),
                        "symbol declared in several model files"
                    );
                }
                None => {
                    self.symbols.insert(symbol, file.to_path_buf());
                }
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Path> {
        self.symbols.get(symbol).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the explicit bindings followed by bindings for every type with
    /// resolvers that has no explicit binding but a same-named model symbol.
    pub fn bindings_for(&self, graph: &SchemaGraph, explicit: &[ModelBinding]) -> Vec<ModelBinding> {
        let mut bindings = explicit.to_vec();

        for ty in graph.user_types().filter(|t| t.has_resolvers()) {
            if explicit.iter().any(|b| b.type_name == ty.name) {
                continue;
            }
            if let Some(file) = self.get(&ty.name) {
                tracing::debug!(type_name = %ty.name, file = %file.display(), "binding from model files");
                bindings.push(ModelBinding::new(
                    ty.name.clone(),
                    ModelReference::new(file, ty.name.clone()),
                ));
            }
        }

        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declaration_wins() {
        let mut index = SymbolIndex::new();
        index.insert_all(Path::new("a.ts"), ["User".to_string(), "Post".to_string()]);
        index.insert_all(Path::new("b.ts"), ["User".to_string(), "Comment".to_string()]);

        assert_eq!(index.get("User"), Some(Path::new("a.ts")));
        assert_eq!(index.get("Comment"), Some(Path::new("b.ts")));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_build_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ts");
        let b = dir.path().join("b.ts");
        std::fs::write(&a, "export interface User { id: string }").unwrap();
        std::fs::write(&b, "export interface User { name: string }\ntype Post = {}").unwrap();

        let index = SymbolIndex::build(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(index.get("User"), Some(a.as_path()));
        assert_eq!(index.get("Post"), Some(b.as_path()));

        assert!(SymbolIndex::build(&[dir.path().join("missing.ts")]).is_err());
    }

    #[test]
    fn test_explicit_bindings_win() {
        let graph = SchemaGraph::parse(
            "type Query { user: User post: Post } type User { id: ID } type Post { id: ID } enum Role { A }",
        )
        .unwrap();

        let mut index = SymbolIndex::new();
        index.insert_all(
            Path::new("models.ts"),
            ["User", "Post", "Role"].map(String::from),
        );

        let explicit = vec![ModelBinding::parse("User", "./user.ts:UserModel")];
        let bindings = index.bindings_for(&graph, &explicit);

        let summary: Vec<_> = bindings
            .iter()
            .map(|b| (b.type_name.as_str(), b.reference.to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("User", "./user.ts:UserModel".to_string()),
                ("Post", "models.ts:Post".to_string()),
            ]
        );
    }
}
