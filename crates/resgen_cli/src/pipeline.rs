//! The generate pipeline: schema, model resolution, checking, code generation.

use crate::config::Config;
use resgen_codegen::{write_artifacts, CodeGenerator, CodegenError, GeneratedCode, WriteReport};
use resgen_core::DiagnosticBag;
use resgen_resolver::{ModelResolver, ResolveError, ResolvedModels, SymbolIndex};
use resgen_schema::{ScalarMap, SchemaError, SchemaGraph};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Inputs that went through model resolution and checking.
#[derive(Debug)]
pub struct Checked {
    pub graph: SchemaGraph,
    pub models: ResolvedModels,
    pub scalars: ScalarMap,
    pub diagnostics: DiagnosticBag,
}

impl Checked {
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Loads the schema, resolves every model binding and checks them.
pub fn check(config: &Config) -> Result<Checked, PipelineError> {
    let graph = SchemaGraph::load(&config.schema)?;

    let index = SymbolIndex::build(&config.model_files)?;
    let bindings = index.bindings_for(&graph, &config.bindings());
    tracing::debug!(
        bindings = bindings.len(),
        indexed = index.len(),
        "collected model bindings"
    );

    let context = config.context_reference();
    let models = ModelResolver::new(&config.base_dir)
        .with_language(config.language)
        .resolve(&bindings, context.as_ref())?;

    let scalars = config.scalar_map();
    let diagnostics = resgen_semantic::check(&graph, &models, &scalars).diagnostics;

    Ok(Checked {
        graph,
        models,
        scalars,
        diagnostics,
    })
}

/// Options for [`run`].
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub scaffold: bool,
    /// Render everything but write nothing.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scaffold: true,
            dry_run: false,
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub enum Outcome {
    /// Checking reported errors; nothing was generated.
    Invalid { diagnostics: DiagnosticBag },
    Generated {
        /// Warnings from checking.
        diagnostics: DiagnosticBag,
        code: GeneratedCode,
        /// Empty on a dry run.
        report: WriteReport,
    },
}

impl Outcome {
    pub fn diagnostics(&self) -> &DiagnosticBag {
        match self {
            Self::Invalid { diagnostics } | Self::Generated { diagnostics, .. } => diagnostics,
        }
    }
}

/// Runs the whole pipeline. Code is only generated if checking succeeds.
pub fn run(config: &Config, options: RunOptions) -> Result<Outcome, PipelineError> {
    let checked = check(config)?;
    if !checked.is_ok() {
        return Ok(Outcome::Invalid {
            diagnostics: checked.diagnostics,
        });
    }

    let code = CodeGenerator::new(
        &checked.graph,
        &checked.models,
        &checked.scalars,
        config.codegen_options(options.scaffold),
    )
    .generate()?;

    let report = if options.dry_run {
        WriteReport::default()
    } else {
        write_artifacts(code.artifacts())?
    };

    Ok(Outcome::Generated {
        diagnostics: checked.diagnostics,
        code,
        report,
    })
}
