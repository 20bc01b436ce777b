//! Resolver code generation for resgen.
//!
//! Produces a TypeScript typings module describing every resolver's exact
//! signature, plus create-once scaffolding with stub implementations.
//!
//! # Example
//!
//! ```ignore
//! use resgen_codegen::{CodeGenerator, CodegenOptions};
//!
//! let generator = CodeGenerator::new(&graph, &models, &scalars, CodegenOptions::new("generated/resolvers.ts"));
//! let code = generator.generate()?;
//! write_artifacts(code.artifacts())?;
//! ```

pub mod emit;
pub mod imports;
pub mod scaffold;
pub mod signature;
pub mod typescript;
mod writer;

pub use emit::{write_artifacts, Artifact, WriteMode, WriteReport};
pub use scaffold::{ScaffoldLayout, ScaffoldOptions};
pub use signature::{FieldPlan, ParentKind, Planner, ResolverPlan, TypePlan};

use resgen_core::Language;
use resgen_resolver::ResolvedModels;
use resgen_schema::{ScalarMap, SchemaGraph};
use std::path::PathBuf;
use thiserror::Error;

/// Code generation failures.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The inputs disagree in a way validation should have caught.
    #[error("internal inconsistency: {0}")]
    Invariant(String),

    /// A schema type would be declared under a name the typings already use.
    #[error("`{name}` would be declared twice in the typings; rename the schema type")]
    NameConflict { name: String },

    /// Two scaffold files, or a scaffold and the index, share a file name.
    #[error("scaffold file `{file}` would be written for more than one group or type")]
    ScaffoldConflict { file: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Code generation options.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub language: Language,
    /// Where the typings module is written.
    pub typings_path: PathBuf,
    /// Scaffolding, if requested.
    pub scaffold: Option<ScaffoldOptions>,
}

impl CodegenOptions {
    pub fn new(typings_path: impl Into<PathBuf>) -> Self {
        Self {
            language: Language::default(),
            typings_path: typings_path.into(),
            scaffold: None,
        }
    }

    #[must_use]
    pub fn with_scaffold(mut self, scaffold: ScaffoldOptions) -> Self {
        self.scaffold = Some(scaffold);
        self
    }
}

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub typings: Artifact,
    pub scaffolds: Vec<Artifact>,
}

impl GeneratedCode {
    /// The typings first, then every scaffold.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        std::iter::once(&self.typings).chain(&self.scaffolds)
    }
}

/// Main code generator.
///
/// The inputs must have passed validation; anything validation rejects
/// surfaces here as [`CodegenError::Invariant`].
pub struct CodeGenerator<'a> {
    graph: &'a SchemaGraph,
    models: &'a ResolvedModels,
    scalars: &'a ScalarMap,
    options: CodegenOptions,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        models: &'a ResolvedModels,
        scalars: &'a ScalarMap,
        options: CodegenOptions,
    ) -> Self {
        Self {
            graph,
            models,
            scalars,
            options,
        }
    }

    /// Generates the typings and, if configured, the scaffolds.
    pub fn generate(&self) -> Result<GeneratedCode, CodegenError> {
        let planner = Planner::new(self.graph, self.models, self.scalars, self.options.language);
        let plan = planner.plan(&self.options.typings_path)?;

        let typings = typescript::render_typings(self.graph, &planner, &plan)?;
        let scaffolds = match &self.options.scaffold {
            Some(scaffold) => scaffold::render_scaffolds(
                &plan,
                scaffold,
                &self.options.typings_path,
                self.options.language,
            )?,
            None => Vec::new(),
        };

        tracing::debug!(
            types = plan.types.len(),
            scaffolds = scaffolds.len(),
            "generated resolvers"
        );

        Ok(GeneratedCode {
            typings: Artifact::typings(&self.options.typings_path, typings),
            scaffolds,
        })
    }
}
