//! Diagnostic reporting for resgen.
//!
//! Every configuration problem found while resolving models or checking them
//! against the schema is reported as a [`Diagnostic`]. Diagnostics are
//! collected, never thrown, so a single run surfaces all of them.

use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// An error that blocks code generation.
    Error,
    /// A warning that doesn't block code generation.
    Warning,
}

impl DiagnosticSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of inconsistency a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCategory {
    /// A model path could not be resolved to a source file.
    PathNotFound,
    /// The context symbol is not declared in its file.
    SymbolNotFound,
    /// A binding names a type the schema doesn't define.
    UnknownType,
    /// A type needs a model but has none and can't be resolved by default.
    MissingModel,
    /// A bound model symbol is not declared in its file.
    ModelNotFound,
    /// A model or context symbol is declared but not a named export.
    ModelNotExported,
    /// Enum types can't be bound to models.
    UnsupportedEnumBinding,
    /// Union types can't be bound to models.
    UnsupportedUnionBinding,
    /// A custom scalar has no host type mapping.
    UnmappedScalar,
    /// A binding that never takes part in resolution.
    UnusedBinding,
}

impl DiagnosticCategory {
    /// Returns the stable diagnostic code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PathNotFound => "R0001",
            Self::SymbolNotFound => "R0002",
            Self::UnknownType => "R0010",
            Self::MissingModel => "R0011",
            Self::ModelNotFound => "R0012",
            Self::ModelNotExported => "R0013",
            Self::UnsupportedEnumBinding => "R0020",
            Self::UnsupportedUnionBinding => "R0021",
            Self::UnmappedScalar => "R0030",
            Self::UnusedBinding => "R0100",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PathNotFound => "PathNotFound",
            Self::SymbolNotFound => "SymbolNotFound",
            Self::UnknownType => "UnknownType",
            Self::MissingModel => "MissingModel",
            Self::ModelNotFound => "ModelNotFound",
            Self::ModelNotExported => "ModelNotExported",
            Self::UnsupportedEnumBinding => "UnsupportedEnumBinding",
            Self::UnsupportedUnionBinding => "UnsupportedUnionBinding",
            Self::UnmappedScalar => "UnmappedScalar",
            Self::UnusedBinding => "UnusedBinding",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Category of the problem.
    pub category: DiagnosticCategory,
    /// Schema type the diagnostic is about. `None` for the context binding.
    pub type_name: Option<String>,
    /// Field of `type_name`, if the problem is field specific.
    pub field_name: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            category,
            type_name: None,
            field_name: None,
            message: message.into(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            category,
            type_name: None,
            field_name: None,
            message: message.into(),
        }
    }

    /// Attaches the schema type.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Attaches the field.
    pub fn with_field(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Returns true for error-severity diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// Returns `Type.field`, `Type`, or `context` depending on what's attached.
    #[must_use]
    pub fn subject(&self) -> String {
        match (&self.type_name, &self.field_name) {
            (Some(ty), Some(field)) => format!("{ty}.{field}"),
            (Some(ty), None) => ty.clone(),
            (None, _) => "context".to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}: {}",
            self.severity,
            self.category.code(),
            self.subject(),
            self.message
        )
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Returns true if a diagnostic of `category` was reported.
    #[must_use]
    pub fn contains(&self, category: DiagnosticCategory) -> bool {
        self.diagnostics.iter().any(|d| d.category == category)
    }

    /// Returns every diagnostic of `category`.
    pub fn of_category(&self, category: DiagnosticCategory) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category == category)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.add(Diagnostic::error(DiagnosticCategory::MissingModel, "no model").with_type("User"));
        bag.add(Diagnostic::warning(DiagnosticCategory::UnusedBinding, "unused").with_type("Post"));

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.len(), 2);
        assert!(bag.contains(DiagnosticCategory::UnusedBinding));
        assert!(!bag.contains(DiagnosticCategory::UnmappedScalar));
    }

    #[test]
    fn test_warnings_do_not_count_as_errors() {
        let mut bag = DiagnosticBag::new();
        bag.add(Diagnostic::warning(DiagnosticCategory::UnusedBinding, "unused"));
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(DiagnosticCategory::ModelNotFound, "`User` not declared")
            .with_type("User")
            .with_field("name");
        assert_eq!(
            diag.to_string(),
            "error[R0012]: User.name: `User` not declared"
        );

        let context = Diagnostic::error(DiagnosticCategory::SymbolNotFound, "missing");
        assert_eq!(context.subject(), "context");
    }
}
