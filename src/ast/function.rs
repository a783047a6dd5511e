//! Top-level function definitions. Grounded on `ast/fn_def.rs` in the
//! teacher: a name, a parameter list, a return type, and a body block.

use pest::iterators::Pair;

use super::block::Block;
use super::param::Param;
use super::type_name::TypeExpr;
use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeExpr,
    pub body: Block,
    pub position: Position,
}

impl FunctionDecl {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> FunctionDecl {
        assert_eq!(pair.as_rule(), Rule::function_def);
        let (line, col) = pair.as_span().start_pos().line_col();
        let mut inner = pair.into_inner();

        let name = inner.next().expect("function_def has a name").as_str().to_owned();

        let mut params = Vec::new();
        let mut next = inner.next().expect("function_def has a return type or param_list");
        if next.as_rule() == Rule::param_list {
            params = next
                .into_inner()
                .map(|p| Param::from_pair(p, file))
                .collect();
            next = inner.next().expect("function_def has a return type after params");
        }
        let return_type = TypeExpr::from_pair(next);

        let body = Block::from_pair(inner.next().expect("function_def has a body"), file);

        FunctionDecl {
            name,
            params,
            return_type,
            body,
            position: (file.to_owned(), line, col),
        }
    }
}
