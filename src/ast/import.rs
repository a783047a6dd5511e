//! `import` declarations (spec.md §4.1: only a fixed allow-list resolves).

use pest::iterators::Pair;

use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub position: Position,
}

impl Import {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Import {
        assert_eq!(pair.as_rule(), Rule::import_stmt);
        let (line, col) = pair.as_span().start_pos().line_col();
        let dotted = pair
            .into_inner()
            .next()
            .expect("import_stmt has a dotted_name");
        Import {
            path: dotted.as_str().to_owned(),
            position: (file.to_owned(), line, col),
        }
    }
}
