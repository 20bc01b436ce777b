//! Core utilities for resgen.
//!
//! This crate provides foundational types used throughout resgen:
//! - `diagnostics`: Configuration diagnostics
//! - `language`: Supported host languages

pub mod diagnostics;
pub mod language;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCategory, DiagnosticSeverity};
pub use language::Language;
