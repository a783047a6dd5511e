//! Surface type syntax (spec.md §3: the closed, finite type lattice).
//!
//! Grounded on `ast/types.rs::Type` in the teacher (an enum built straight
//! off a pest `Pair` via `from_pair`), generalized from the teacher's
//! `Literal`/`Function`/`Array` shape to this dialect's scalar/container/
//! named-record shape.

use pest::iterators::Pair;

use crate::lexer::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Scalar(ScalarType),
    List(Box<TypeExpr>),
    Dict(Box<TypeExpr>, Box<TypeExpr>),
    Set(Box<TypeExpr>),
    /// A reference to a user-declared record, resolved in the analyzer.
    Named(String),
}

impl TypeExpr {
    pub fn from_pair(pair: Pair<Rule>) -> TypeExpr {
        assert_eq!(pair.as_rule(), Rule::type_name);
        let inner = pair.into_inner().next().expect("type_name has one child");
        Self::from_inner(inner)
    }

    fn from_inner(pair: Pair<Rule>) -> TypeExpr {
        match pair.as_rule() {
            Rule::scalar_type => TypeExpr::Scalar(match pair.as_str() {
                "int" => ScalarType::Int,
                "float" => ScalarType::Float,
                "bool" => ScalarType::Bool,
                "str" => ScalarType::Str,
                "none" => ScalarType::None,
                other => unreachable!("unknown scalar type '{other}'"),
            }),
            Rule::container_type => {
                let inner = pair.into_inner().next().expect("container_type child");
                match inner.as_rule() {
                    Rule::list_type => {
                        let elem = inner.into_inner().next().expect("list_type elem");
                        TypeExpr::List(Box::new(TypeExpr::from_pair(elem)))
                    }
                    Rule::set_type => {
                        let elem = inner.into_inner().next().expect("set_type elem");
                        TypeExpr::Set(Box::new(TypeExpr::from_pair(elem)))
                    }
                    Rule::dict_type => {
                        let mut inner = inner.into_inner();
                        let key = TypeExpr::from_pair(inner.next().expect("dict_type key"));
                        let value = TypeExpr::from_pair(inner.next().expect("dict_type value"));
                        TypeExpr::Dict(Box::new(key), Box::new(value))
                    }
                    other => unreachable!("unexpected container_type child {other:?}"),
                }
            }
            Rule::ident => TypeExpr::Named(pair.as_str().to_owned()),
            other => unreachable!("unexpected type_name child {other:?}"),
        }
    }

    /// True if this type (or one of its element types) nests a container
    /// inside another container — rejected per spec.md §3/§9.
    pub fn has_nested_container(&self) -> bool {
        match self {
            TypeExpr::Scalar(_) | TypeExpr::Named(_) => false,
            TypeExpr::List(elem) | TypeExpr::Set(elem) => elem.is_container(),
            TypeExpr::Dict(key, value) => key.is_container() || value.is_container(),
        }
    }

    fn is_container(&self) -> bool {
        matches!(self, TypeExpr::List(_) | TypeExpr::Dict(_, _) | TypeExpr::Set(_))
    }
}
