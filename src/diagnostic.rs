//! Shared diagnostic types used across every phase of the pipeline.
//!
//! Grounded on `ast/parse_error.rs` and `typechecker/error.rs` in the
//! teacher: a position tuple of `(file, line, col)` plus a message, carried
//! on a `Display + std::error::Error` type. Here the concept is promoted to
//! a single shared `Diagnostic` so the validator can collect many of them
//! per §4.1 ("do not stop on first error within a single declaration").

use std::fmt::{self, Display};

/// A position within a source file: `(file name, 1-based line, 1-based column)`.
pub type Position = (String, usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A single diagnostic record: a stable rule id, a position, a message, and
/// an optional suggested fix. See spec.md §4.1 and §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule_id: &'static str,
    pub position: Position,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(rule_id: &'static str, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            rule_id,
            position,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (file, line, col) = &self.position;
        write!(
            f,
            "{}[{}]: {} ({file}:{line}:{col})",
            self.severity, self.rule_id, self.message
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " — suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// An ordered collection of diagnostics produced by one phase run.
pub type Diagnostics = Vec<Diagnostic>;

/// Rule identifiers. Stable across versions per spec.md §4.1.
pub mod rule {
    pub const UNANNOTATED_BINDING: &str = "E_UNANNOTATED_BINDING";
    pub const UNANNOTATED_PARAM: &str = "E_UNANNOTATED_PARAM";
    pub const UNSUPPORTED_CONSTRUCT: &str = "E_UNSUPPORTED_CONSTRUCT";
    pub const UNSUPPORTED_RECORD_FIELD: &str = "E_UNSUPPORTED_RECORD_FIELD";
    pub const BAD_IMPORT: &str = "E_BAD_IMPORT";
    pub const DUPLICATE_NAME: &str = "E_DUPLICATE_NAME";
    pub const TUPLE_ASSIGNMENT: &str = "E_TUPLE_ASSIGNMENT";
    pub const IMMUTABLE_FIELD_ASSIGN: &str = "E_IMMUTABLE_FIELD_ASSIGN";
    pub const MISSING_RETURN: &str = "E_MISSING_RETURN";
    pub const NESTED_CONTAINER: &str = "E_NESTED_CONTAINER";
    pub const FLOAT_MODULO: &str = "E_FLOAT_MODULO";
    pub const MULTI_GENERATOR: &str = "E_MULTI_GENERATOR";
    pub const PARSE_ERROR: &str = "E_PARSE";
    pub const UNRESOLVED_TYPE: &str = "E_UNRESOLVED_TYPE";
    pub const TYPE_MISMATCH: &str = "E_TYPE_MISMATCH";
    pub const UNSUPPORTED_TYPE: &str = "E_UNSUPPORTED_TYPE";
}
