//! Diagnostic constructors specific to type analysis. Grounded on
//! `typechecker/error.rs::TypeError` in the teacher; here they build the
//! same shared [`crate::diagnostic::Diagnostic`] every other phase does
//! rather than a phase-local error type, since spec.md §4.1 asks for one
//! diagnostic collection across the whole run.

use crate::diagnostic::{rule, Diagnostic, Position};

use super::ctype::CType;

pub fn type_mismatch(position: Position, expected: &CType, found: &CType) -> Diagnostic {
    Diagnostic::error(
        rule::TYPE_MISMATCH,
        position,
        format!("expected type '{expected}', found '{found}'"),
    )
}

pub fn unresolved_type(position: Position, name: &str) -> Diagnostic {
    Diagnostic::error(
        rule::UNRESOLVED_TYPE,
        position,
        format!("'{name}' does not name a known type"),
    )
}

pub fn unsupported_type(position: Position, description: impl Into<String>) -> Diagnostic {
    Diagnostic::error(rule::UNSUPPORTED_TYPE, position, description.into())
}

pub fn float_modulo(position: Position) -> Diagnostic {
    Diagnostic::error(
        rule::FLOAT_MODULO,
        position,
        "'%' is not supported on float operands",
    )
}

pub fn multi_generator(position: Position) -> Diagnostic {
    Diagnostic::error(
        rule::MULTI_GENERATOR,
        position,
        "comprehensions support exactly one 'for' clause",
    )
}

pub fn immutable_field_assign(position: Position, record: &str) -> Diagnostic {
    Diagnostic::error(
        rule::IMMUTABLE_FIELD_ASSIGN,
        position,
        format!("cannot assign to a field of '{record}': declared as 'record', not 'mutrecord'"),
    )
}

pub fn unsupported_record_field(position: Position, record: &str, field: &str) -> Diagnostic {
    Diagnostic::error(
        rule::UNSUPPORTED_RECORD_FIELD,
        position,
        format!("'{record}' has no field '{field}'"),
    )
}
