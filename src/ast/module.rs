//! Top-level module: the root of one source file's AST.

use pest::iterators::Pairs;

use super::function::FunctionDecl;
use super::import::Import;
use super::record::RecordDecl;
use super::Rule;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub imports: Vec<Import>,
    pub records: Vec<RecordDecl>,
    pub functions: Vec<FunctionDecl>,
}

impl Module {
    /// `pairs` is the result of `CGenParser::parse_module`: one top-level
    /// pair for the `module` rule, wrapping `item*` and a trailing `EOI`.
    pub fn from_pairs(pairs: Pairs<Rule>, file: &str) -> Module {
        let mut module = Module::default();

        let root = pairs
            .into_iter()
            .next()
            .expect("parse_module always yields one module pair");
        assert_eq!(root.as_rule(), Rule::module);

        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::EOI => {}
                Rule::item => {
                    let item = pair.into_inner().next().expect("item wraps a concrete kind");
                    match item.as_rule() {
                        Rule::import_stmt => module.imports.push(Import::from_pair(item, file)),
                        Rule::record_decl => module.records.push(RecordDecl::from_pair(item, file)),
                        Rule::function_def => {
                            module.functions.push(FunctionDecl::from_pair(item, file))
                        }
                        other => unreachable!("unexpected item child {other:?}"),
                    }
                }
                other => unreachable!("unexpected top-level rule {other:?}"),
            }
        }

        module
    }
}
