//! Model references (`path:Symbol`).

use std::fmt;
use std::path::PathBuf;

/// A symbolic reference to a model declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
    /// File path as written, relative to the configuration directory.
    pub path: PathBuf,
    pub symbol: String,
}

impl ModelReference {
    pub fn new(path: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            symbol: symbol.into(),
        }
    }

    /// Parses `path:Symbol`, splitting on the last colon.
    ///
    /// When no symbol follows the path, `default_symbol` is used.
    pub fn parse(raw: &str, default_symbol: &str) -> Self {
        match raw.rsplit_once(':') {
            Some((path, symbol)) if !path.is_empty() && is_identifier(symbol) => {
                Self::new(path, symbol)
            }
            _ => Self::new(raw, default_symbol),
        }
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.symbol)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// A schema type bound to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    pub type_name: String,
    pub reference: ModelReference,
}

impl ModelBinding {
    pub fn new(type_name: impl Into<String>, reference: ModelReference) -> Self {
        Self {
            type_name: type_name.into(),
            reference,
        }
    }

    /// Parses a binding from its configured reference string.
    pub fn parse(type_name: &str, raw: &str) -> Self {
        Self::new(type_name, ModelReference::parse(raw, type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let reference = ModelReference::parse("./types.ts:User", "Ignored");
        assert_eq!(reference.path, PathBuf::from("./types.ts"));
        assert_eq!(reference.symbol, "User");
        assert_eq!(reference.to_string(), "./types.ts:User");
    }

    #[test]
    fn test_symbol_defaults_to_type_name() {
        let binding = ModelBinding::parse("Post", "./models/post");
        assert_eq!(binding.reference.path, PathBuf::from("./models/post"));
        assert_eq!(binding.reference.symbol, "Post");
    }

    #[test]
    fn test_splits_on_last_colon() {
        let reference = ModelReference::parse("C:/models/a:b.ts:Thing", "X");
        assert_eq!(reference.path, PathBuf::from("C:/models/a:b.ts"));
        assert_eq!(reference.symbol, "Thing");

        let reference = ModelReference::parse("C:/models/user.ts", "User");
        assert_eq!(reference.path, PathBuf::from("C:/models/user.ts"));
        assert_eq!(reference.symbol, "User");
    }
}
