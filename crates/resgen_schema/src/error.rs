use miette::{Diagnostic, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a schema.
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("invalid schema: {message}")]
    #[diagnostic(code(resgen::schema::syntax))]
    Syntax {
        #[source_code]
        src: String,
        message: String,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("failed to read schema {}: {source}", path.display())]
    #[diagnostic(code(resgen::schema::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
