//! Function parameters. Every parameter must carry a type annotation
//! (spec.md §3 invariant 1) — there is no inference fallback.

use pest::iterators::Pair;

use super::{Position, Rule, TypeExpr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub type_expr: TypeExpr,
    pub position: Position,
}

impl Param {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Param {
        assert_eq!(pair.as_rule(), Rule::param);
        let (line, col) = pair.as_span().start_pos().line_col();
        let mut inner = pair.into_inner();
        let name = inner.next().expect("param has a name").as_str().to_owned();
        let type_expr = TypeExpr::from_pair(inner.next().expect("param has a type_name"));
        Param {
            name,
            type_expr,
            position: (file.to_owned(), line, col),
        }
    }
}
