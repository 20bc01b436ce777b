//! Writing generated artifacts to disk.

use crate::CodegenError;
use std::fs;
use std::path::{Path, PathBuf};

/// How an artifact treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Regenerated on every run.
    Overwrite,
    /// Written only if nothing exists at the path.
    CreateIfAbsent,
}

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
    pub mode: WriteMode,
}

impl Artifact {
    pub fn typings(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
            mode: WriteMode::Overwrite,
        }
    }

    pub fn scaffold(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
            mode: WriteMode::CreateIfAbsent,
        }
    }
}

/// Paths touched by [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Scaffolds left alone because the file already existed.
    pub skipped: Vec<PathBuf>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CodegenError + '_ {
    move |source| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes artifacts, creating parent directories as needed.
pub fn write_artifacts<'a>(
    artifacts: impl IntoIterator<Item = &'a Artifact>,
) -> Result<WriteReport, CodegenError> {
    let mut report = WriteReport::default();

    for artifact in artifacts {
        let path = &artifact.path;
        if artifact.mode == WriteMode::CreateIfAbsent && path.exists() {
            tracing::debug!(path = %path.display(), "scaffold exists, skipping");
            report.skipped.push(path.clone());
            continue;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(path, &artifact.contents).map_err(io_error(path))?;

        tracing::debug!(path = %path.display(), "wrote");
        report.written.push(path.clone());
    }

    Ok(report)
}
