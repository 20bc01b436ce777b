//! Binding validation for resgen.
//!
//! This crate provides:
//! - `classify`: default resolvability, reachability and echo fields
//! - `checker`: the diagnostics pass gating code generation

pub mod checker;
pub mod classify;

pub use checker::{check, CheckResult, Checker};
pub use classify::{is_echo_field, Classifier};
