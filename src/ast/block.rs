use pest::iterators::Pair;

use super::stmt::Stmt;
use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub position: Position,
}

impl Block {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Block {
        assert_eq!(pair.as_rule(), Rule::block);
        let (line, col) = pair.as_span().start_pos().line_col();
        let stmts = pair.into_inner().map(|p| Stmt::from_pair(p, file)).collect();
        Block {
            stmts,
            position: (file.to_owned(), line, col),
        }
    }
}
