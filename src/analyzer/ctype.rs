//! The resolved, finite type lattice (spec.md §3) that the surface
//! `TypeExpr` gets checked against. Grounded on
//! `typechecker/variabletype.rs::VariableType` in the teacher, which plays
//! the same "resolved type, one level past the raw syntax" role there.

use std::fmt;

use crate::ast::{ScalarType, TypeExpr};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CType {
    Int,
    Float,
    Bool,
    Str,
    None,
    List(Box<CType>),
    Dict(Box<CType>, Box<CType>),
    Set(Box<CType>),
    Record(String),
}

impl CType {
    pub fn is_container(&self) -> bool {
        matches!(self, CType::List(_) | CType::Dict(_, _) | CType::Set(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CType::Int | CType::Float)
    }

    /// Resolve a surface `TypeExpr` against the set of record names declared
    /// in this module. `None` means the name doesn't resolve to anything
    /// known — the caller turns that into `E_UNRESOLVED_TYPE`.
    pub fn resolve(type_expr: &TypeExpr, record_names: &std::collections::HashSet<String>) -> Option<CType> {
        match type_expr {
            TypeExpr::Scalar(ScalarType::Int) => Some(CType::Int),
            TypeExpr::Scalar(ScalarType::Float) => Some(CType::Float),
            TypeExpr::Scalar(ScalarType::Bool) => Some(CType::Bool),
            TypeExpr::Scalar(ScalarType::Str) => Some(CType::Str),
            TypeExpr::Scalar(ScalarType::None) => Some(CType::None),
            TypeExpr::List(elem) => Some(CType::List(Box::new(Self::resolve(elem, record_names)?))),
            TypeExpr::Set(elem) => Some(CType::Set(Box::new(Self::resolve(elem, record_names)?))),
            TypeExpr::Dict(key, value) => Some(CType::Dict(
                Box::new(Self::resolve(key, record_names)?),
                Box::new(Self::resolve(value, record_names)?),
            )),
            TypeExpr::Named(name) => {
                if record_names.contains(name) {
                    Some(CType::Record(name.clone()))
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Int => write!(f, "int"),
            CType::Float => write!(f, "float"),
            CType::Bool => write!(f, "bool"),
            CType::Str => write!(f, "str"),
            CType::None => write!(f, "none"),
            CType::List(elem) => write!(f, "list<{elem}>"),
            CType::Dict(key, value) => write!(f, "dict<{key}, {value}>"),
            CType::Set(elem) => write!(f, "set<{elem}>"),
            CType::Record(name) => write!(f, "{name}"),
        }
    }
}
