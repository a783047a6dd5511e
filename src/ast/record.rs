//! Record (`record`/`mutrecord`) declarations. Grounded on
//! `ast/struct_declaration.rs` in the teacher — same field-list shape, with
//! mutability tracked on the declaration rather than on individual fields
//! (spec.md §3: field assignment is only legal through a `mutrecord`).

use pest::iterators::Pair;

use super::type_name::TypeExpr;
use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub type_expr: TypeExpr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub name: String,
    pub mutable: bool,
    pub fields: Vec<FieldDecl>,
    pub position: Position,
}

impl RecordDecl {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> RecordDecl {
        assert_eq!(pair.as_rule(), Rule::record_decl);
        let (line, col) = pair.as_span().start_pos().line_col();
        let mut inner = pair.into_inner();

        let kind = inner.next().expect("record_decl has a record_kind");
        assert_eq!(kind.as_rule(), Rule::record_kind);
        let mutable = kind.as_str() == "mutrecord";

        let name = inner.next().expect("record_decl has a name").as_str().to_owned();

        let field_block = inner.next().expect("record_decl has a field_block");
        assert_eq!(field_block.as_rule(), Rule::field_block);
        let fields = field_block
            .into_inner()
            .map(|field| {
                assert_eq!(field.as_rule(), Rule::field_decl);
                let (fline, fcol) = field.as_span().start_pos().line_col();
                let mut parts = field.into_inner();
                let fname = parts.next().expect("field_decl has a name").as_str().to_owned();
                let type_expr = TypeExpr::from_pair(parts.next().expect("field_decl has a type_name"));
                FieldDecl {
                    name: fname,
                    type_expr,
                    position: (file.to_owned(), fline, fcol),
                }
            })
            .collect();

        RecordDecl {
            name,
            mutable,
            fields,
            position: (file.to_owned(), line, col),
        }
    }
}
