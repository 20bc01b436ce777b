//! Model file path inference.

use resgen_core::Language;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a model path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no file at {}", attempted.display())]
    NotFound { attempted: PathBuf },

    #[error("directory {} has no {index}", directory.display())]
    MissingIndex {
        directory: PathBuf,
        index: &'static str,
    },

    #[error("{} is not a .{expected} file", path.display())]
    WrongExtension {
        path: PathBuf,
        expected: &'static str,
    },
}

impl PathError {
    /// The path the failed lookup ended at.
    pub fn attempted(&self) -> &Path {
        match self {
            Self::NotFound { attempted } => attempted,
            Self::MissingIndex { directory, .. } => directory,
            Self::WrongExtension { path, .. } => path,
        }
    }
}

/// Resolves a model path to the file that declares it.
///
/// Relative paths are joined onto `base_dir`. The literal path is tried
/// first, then the path with the language's extension appended. A directory
/// resolves to its index file.
pub fn resolve_model_path(
    base_dir: &Path,
    path: &Path,
    language: Language,
) -> Result<PathBuf, PathError> {
    let literal = base_dir.join(path);

    let found = if literal.exists() {
        literal
    } else {
        let mut with_extension = OsString::from(literal.as_os_str());
        with_extension.push(".");
        with_extension.push(language.extension());
        let with_extension = PathBuf::from(with_extension);
        if !with_extension.exists() {
            return Err(PathError::NotFound {
                attempted: with_extension,
            });
        }
        with_extension
    };

    if found.is_dir() {
        let index = found.join(language.index_file());
        return if index.is_file() {
            Ok(index)
        } else {
            Err(PathError::MissingIndex {
                directory: found,
                index: language.index_file(),
            })
        };
    }

    if found.extension().and_then(|e| e.to_str()) != Some(language.extension()) {
        return Err(PathError::WrongExtension {
            path: found,
            expected: language.extension(),
        });
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("basic")).unwrap();
        fs::write(dir.path().join("basic/index.ts"), "export interface Context {}").unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("types.ts"), "").unwrap();
        fs::write(dir.path().join("types.js"), "").unwrap();
        dir
    }

    #[test]
    fn test_literal_and_extension() {
        let dir = fixture();
        let base = dir.path();
        let ts = Language::TypeScript;

        assert_eq!(
            resolve_model_path(base, Path::new("types.ts"), ts).unwrap(),
            base.join("types.ts")
        );
        assert_eq!(
            resolve_model_path(base, Path::new("./types"), ts).unwrap(),
            base.join("./types.ts")
        );
        assert_eq!(
            resolve_model_path(base, Path::new("basic/index"), ts).unwrap(),
            base.join("basic/index.ts")
        );
    }

    #[test]
    fn test_directory_index() {
        let dir = fixture();
        let base = dir.path();

        assert_eq!(
            resolve_model_path(base, Path::new("basic"), Language::TypeScript).unwrap(),
            base.join("basic").join("index.ts")
        );
        assert!(matches!(
            resolve_model_path(base, Path::new("empty"), Language::TypeScript),
            Err(PathError::MissingIndex { .. })
        ));
    }

    #[test]
    fn test_failures() {
        let dir = fixture();
        let base = dir.path();

        let err = resolve_model_path(base, Path::new("missing"), Language::TypeScript).unwrap_err();
        assert_eq!(err.attempted(), base.join("missing.ts"));

        assert!(matches!(
            resolve_model_path(base, Path::new("types.js"), Language::TypeScript),
            Err(PathError::WrongExtension { .. })
        ));
    }
}
