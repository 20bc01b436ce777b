//! Model resolution for resgen.
//!
//! Turns `path:Symbol` bindings into the declared shapes of host-language
//! models. Resolution is best effort per binding: a missing file or symbol
//! becomes [`ResolvedModel::Unresolved`] and is reported later by the
//! checker. Only unexpected I/O failures are errors.

pub mod index;
pub mod path;
pub mod reference;

use indexmap::IndexMap;
use rayon::prelude::*;
use resgen_core::Language;
use resgen_syntax::{ExtractError, ShapeMember, SymbolLookup};
use std::path::PathBuf;
use thiserror::Error;

pub use index::SymbolIndex;
pub use path::{resolve_model_path, PathError};
pub use reference::{ModelBinding, ModelReference};

/// Unexpected failures during resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// The declared shape of a resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelShape {
    pub symbol: String,
    /// File declaring the symbol.
    pub file: PathBuf,
    pub members: Vec<ShapeMember>,
    /// Declared as a named export, so the typings can import it.
    pub exported: bool,
}

impl ModelShape {
    pub fn member(&self, name: &str) -> Option<&ShapeMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Why a reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    PathNotFound(PathError),
    SymbolNotFound { file: PathBuf },
}

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedModel {
    Resolved(ModelShape),
    Unresolved {
        reference: ModelReference,
        reason: UnresolvedReason,
    },
}

impl ResolvedModel {
    pub fn shape(&self) -> Option<&ModelShape> {
        match self {
            Self::Resolved(shape) => Some(shape),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Resolved bindings keyed and sorted by schema type name, plus the context.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModels {
    pub models: IndexMap<String, ResolvedModel>,
    pub context: Option<ResolvedModel>,
}

impl ResolvedModels {
    pub fn get(&self, type_name: &str) -> Option<&ResolvedModel> {
        self.models.get(type_name)
    }

    /// Returns the shape bound to `type_name`, if it resolved.
    pub fn shape(&self, type_name: &str) -> Option<&ModelShape> {
        self.get(type_name).and_then(ResolvedModel::shape)
    }

    pub fn is_bound(&self, type_name: &str) -> bool {
        self.models.contains_key(type_name)
    }

    pub fn context_shape(&self) -> Option<&ModelShape> {
        self.context.as_ref().and_then(ResolvedModel::shape)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedModel)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Resolves model references relative to a base directory.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    base_dir: PathBuf,
    language: Language,
}

impl ModelResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Resolves a single reference.
    pub fn resolve_reference(
        &self,
        reference: &ModelReference,
    ) -> Result<ResolvedModel, ResolveError> {
        let unresolved = |reason| ResolvedModel::Unresolved {
            reference: reference.clone(),
            reason,
        };

        let file = match resolve_model_path(&self.base_dir, &reference.path, self.language) {
            Ok(file) => file,
            Err(err) => {
                tracing::debug!(%reference, error = %err, "model path not found");
                return Ok(unresolved(UnresolvedReason::PathNotFound(err)));
            }
        };

        match resgen_syntax::extract_symbol(&file, &reference.symbol) {
            Ok(SymbolLookup::Found(shape)) => {
                tracing::debug!(%reference, file = %file.display(), "resolved model");
                Ok(ResolvedModel::Resolved(ModelShape {
                    symbol: shape.name,
                    file,
                    members: shape.members,
                    exported: shape.exported,
                }))
            }
            Ok(SymbolLookup::NotFound) => {
                tracing::debug!(%reference, file = %file.display(), "symbol not found");
                Ok(unresolved(UnresolvedReason::SymbolNotFound { file }))
            }
            // Removed between the path check and the read.
            Err(ExtractError::FileNotFound { path }) => Ok(unresolved(
                UnresolvedReason::PathNotFound(PathError::NotFound { attempted: path }),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves every binding and the optional context reference.
    ///
    /// Bindings are resolved in parallel; the result is sorted by type name
    /// so it doesn't depend on completion order.
    pub fn resolve(
        &self,
        bindings: &[ModelBinding],
        context: Option<&ModelReference>,
    ) -> Result<ResolvedModels, ResolveError> {
        let resolved = bindings
            .par_iter()
            .map(|binding| {
                self.resolve_reference(&binding.reference)
                    .map(|model| (binding.type_name.clone(), model))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut models: IndexMap<String, ResolvedModel> = resolved.into_iter().collect();
        models.sort_keys();

        let context = context
            .map(|reference| self.resolve_reference(reference))
            .transpose()?;

        Ok(ResolvedModels { models, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("basic")).unwrap();
        fs::write(
            dir.path().join("basic/index.ts"),
            "export interface Context { db: any }\nexport interface Number { value: number }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("types.ts"),
            "export type User = { id: string; name?: string }\ninterface Post { title: string }\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_resolve_bindings() {
        let dir = fixture();
        let resolver = ModelResolver::new(dir.path());

        let bindings = vec![
            ModelBinding::parse("User", "./types.ts:User"),
            ModelBinding::parse("Number", "basic/index:Number"),
            ModelBinding::parse("Post", "./types:Post"),
            ModelBinding::parse("Tag", "./types:Tag"),
            ModelBinding::parse("Comment", "./comments:Comment"),
        ];
        let context = ModelReference::parse("basic:Context", "Context");
        let resolved = resolver.resolve(&bindings, Some(&context)).unwrap();

        let keys: Vec<_> = resolved.models.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Comment", "Number", "Post", "Tag", "User"]);

        let number = resolved.shape("Number").unwrap();
        assert_eq!(number.member("value").unwrap().type_text, "number");
        assert_eq!(number.file, dir.path().join("basic/index.ts"));

        assert!(resolved.shape("User").unwrap().member("name").unwrap().optional);
        assert!(resolved.shape("User").unwrap().exported);
        assert!(!resolved.shape("Post").unwrap().exported);
        assert!(matches!(
            resolved.get("Tag"),
            Some(ResolvedModel::Unresolved {
                reason: UnresolvedReason::SymbolNotFound { .. },
                ..
            })
        ));
        assert!(matches!(
            resolved.get("Comment"),
            Some(ResolvedModel::Unresolved {
                reason: UnresolvedReason::PathNotFound(_),
                ..
            })
        ));

        assert!(resolved.context_shape().unwrap().member("db").is_some());
    }

    #[test]
    fn test_context_directory_without_index() {
        let dir = fixture();
        fs::create_dir_all(dir.path().join("noindex")).unwrap();

        let resolved = ModelResolver::new(dir.path())
            .resolve(&[], Some(&ModelReference::new("noindex", "Context")))
            .unwrap();

        assert!(matches!(
            resolved.context,
            Some(ResolvedModel::Unresolved {
                reason: UnresolvedReason::PathNotFound(PathError::MissingIndex { .. }),
                ..
            })
        ));
    }
}
