//! Expressions. Grounded on `ast/expression.rs` and `ast/binary_expr.rs` in
//! the teacher, which build a precedence cascade the same shape as
//! `src/cgen.pest`'s `expr` → `logic_or` → ... → `primary` chain. The
//! teacher folds each cascade level into a left-associative tree as it
//! walks the pairs; this does the same, one `parse_*` function per grammar
//! level.

use pest::iterators::Pair;

use super::ops::{BinOp, UnOp};
use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    LitInt(i64),
    LitFloat(f64),
    LitBool(bool),
    LitStr(String),
    LitNone,
    Name(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Slice(Box<Expr>, Box<Expr>, Box<Expr>),
    Field(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    MethodCall(Box<Expr>, String, Vec<Expr>),
    ListLit(Vec<Expr>),
    SetLit(Vec<Expr>),
    DictLit(Vec<(Expr, Expr)>),
    ListComp {
        element: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
    SetComp {
        element: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        var: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
}

fn pos(pair: &Pair<Rule>, file: &str) -> Position {
    let (line, col) = pair.as_span().start_pos().line_col();
    (file.to_owned(), line, col)
}

impl Expr {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Expr {
        assert_eq!(pair.as_rule(), Rule::expr);
        let inner = pair.into_inner().next().expect("expr wraps logic_or");
        parse_logic_or(inner, file)
    }
}

fn fold_left(
    first: Expr,
    rest: impl Iterator<Item = (BinOp, Expr)>,
    file: &str,
) -> Expr {
    let mut acc = first;
    for (op, rhs) in rest {
        let position = acc.position.clone();
        let _ = file;
        acc = Expr {
            kind: ExprKind::Binary(op, Box::new(acc), Box::new(rhs)),
            position,
        };
    }
    acc
}

fn parse_logic_or(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::logic_or);
    let mut inner = pair.into_inner();
    let first = parse_logic_and(inner.next().expect("logic_or has an operand"), file);
    let rest = inner.map(|p| (BinOp::Or, parse_logic_and(p, file)));
    fold_left(first, rest, file)
}

fn parse_logic_and(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::logic_and);
    let mut inner = pair.into_inner();
    let first = parse_logic_not(inner.next().expect("logic_and has an operand"), file);
    let rest = inner.map(|p| (BinOp::And, parse_logic_not(p, file)));
    fold_left(first, rest, file)
}

fn parse_logic_not(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::logic_not);
    let position = pos(&pair, file);
    let inner = pair.into_inner().next().expect("logic_not has a child");
    match inner.as_rule() {
        Rule::logic_not => Expr {
            kind: ExprKind::Unary(UnOp::Not, Box::new(parse_logic_not(inner, file))),
            position,
        },
        Rule::comparison => parse_comparison(inner, file),
        other => unreachable!("unexpected logic_not child {other:?}"),
    }
}

fn parse_comparison(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::comparison);
    let mut inner = pair.into_inner();
    let first = parse_bitor(inner.next().expect("comparison has an operand"), file);
    let mut acc = first;
    let mut rest = inner;
    while let Some(op_pair) = rest.next() {
        assert_eq!(op_pair.as_rule(), Rule::comparison_op);
        let op = BinOp::from_token(op_pair.as_str());
        let rhs = parse_bitor(rest.next().expect("comparison_op has a right operand"), file);
        let position = acc.position.clone();
        acc = Expr {
            kind: ExprKind::Binary(op, Box::new(acc), Box::new(rhs)),
            position,
        };
    }
    acc
}

fn parse_bitor(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::bitor_expr);
    let mut inner = pair.into_inner();
    let first = parse_bitxor(inner.next().expect("bitor_expr has an operand"), file);
    let rest = inner.map(|p| (BinOp::BitOr, parse_bitxor(p, file)));
    fold_left(first, rest, file)
}

fn parse_bitxor(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::bitxor_expr);
    let mut inner = pair.into_inner();
    let first = parse_bitand(inner.next().expect("bitxor_expr has an operand"), file);
    let rest = inner.map(|p| (BinOp::BitXor, parse_bitand(p, file)));
    fold_left(first, rest, file)
}

fn parse_bitand(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::bitand_expr);
    let mut inner = pair.into_inner();
    let first = parse_additive(inner.next().expect("bitand_expr has an operand"), file);
    let rest = inner.map(|p| (BinOp::BitAnd, parse_additive(p, file)));
    fold_left(first, rest, file)
}

fn parse_additive(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::additive_expr);
    let mut inner = pair.into_inner();
    let first = parse_multiplicative(inner.next().expect("additive_expr has an operand"), file);
    let mut acc = first;
    let mut rest = inner;
    while let Some(op_pair) = rest.next() {
        assert_eq!(op_pair.as_rule(), Rule::add_op);
        let op = BinOp::from_token(op_pair.as_str());
        let rhs = parse_multiplicative(rest.next().expect("add_op has a right operand"), file);
        let position = acc.position.clone();
        acc = Expr {
            kind: ExprKind::Binary(op, Box::new(acc), Box::new(rhs)),
            position,
        };
    }
    acc
}

fn parse_multiplicative(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::multiplicative_expr);
    let mut inner = pair.into_inner();
    let first = parse_unary(inner.next().expect("multiplicative_expr has an operand"), file);
    let mut acc = first;
    let mut rest = inner;
    while let Some(op_pair) = rest.next() {
        assert_eq!(op_pair.as_rule(), Rule::mul_op);
        let op = BinOp::from_token(op_pair.as_str());
        let rhs = parse_unary(rest.next().expect("mul_op has a right operand"), file);
        let position = acc.position.clone();
        acc = Expr {
            kind: ExprKind::Binary(op, Box::new(acc), Box::new(rhs)),
            position,
        };
    }
    acc
}

fn parse_unary(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::unary_expr);
    let position = pos(&pair, file);
    let mut inner = pair.into_inner();
    let first = inner.next().expect("unary_expr has a child");
    match first.as_rule() {
        Rule::unary_op => {
            let op = UnOp::from_token(first.as_str());
            let operand = parse_unary(inner.next().expect("unary_op has an operand"), file);
            Expr {
                kind: ExprKind::Unary(op, Box::new(operand)),
                position,
            }
        }
        Rule::postfix_expr => parse_postfix(first, file),
        other => unreachable!("unexpected unary_expr child {other:?}"),
    }
}

/// Exposed for `stmt.rs`: assignment targets and bare-call statements carry
/// a `postfix_expr` pair directly rather than the full `expr` cascade.
pub(super) fn parse_postfix_expr_standalone(pair: Pair<Rule>, file: &str) -> Expr {
    parse_postfix(pair, file)
}

fn parse_postfix(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::postfix_expr);
    let mut inner = pair.into_inner();
    let mut acc = parse_primary(inner.next().expect("postfix_expr has a primary"), file);
    for suffix in inner {
        assert_eq!(suffix.as_rule(), Rule::postfix_suffix);
        let position = acc.position.clone();
        let kind = suffix.into_inner().next().expect("postfix_suffix wraps a suffix kind");
        acc = match kind.as_rule() {
            Rule::method_call_suffix => {
                let mut parts = kind.into_inner();
                let name = parts.next().expect("method_call_suffix has a name").as_str().to_owned();
                let args = parts.next().map_or(vec![], |p| parse_arg_list(p, file));
                Expr {
                    kind: ExprKind::MethodCall(Box::new(acc), name, args),
                    position,
                }
            }
            Rule::call_suffix => {
                let args = kind
                    .into_inner()
                    .next()
                    .map_or(vec![], |p| parse_arg_list(p, file));
                Expr {
                    kind: ExprKind::Call(Box::new(acc), args),
                    position,
                }
            }
            Rule::field_suffix => {
                let name = kind.into_inner().next().expect("field_suffix has a name").as_str().to_owned();
                Expr {
                    kind: ExprKind::Field(Box::new(acc), name),
                    position,
                }
            }
            Rule::subscript_suffix => {
                let mut parts = kind.into_inner();
                let index = Expr::from_pair(parts.next().expect("subscript_suffix has an index"), file);
                match parts.next() {
                    Some(end_pair) => {
                        let end = Expr::from_pair(end_pair, file);
                        Expr {
                            kind: ExprKind::Slice(Box::new(acc), Box::new(index), Box::new(end)),
                            position,
                        }
                    }
                    None => Expr {
                        kind: ExprKind::Index(Box::new(acc), Box::new(index)),
                        position,
                    },
                }
            }
            other => unreachable!("unexpected postfix_suffix child {other:?}"),
        };
    }
    acc
}

fn parse_arg_list(pair: Pair<Rule>, file: &str) -> Vec<Expr> {
    assert_eq!(pair.as_rule(), Rule::arg_list);
    pair.into_inner().map(|p| Expr::from_pair(p, file)).collect()
}

fn parse_primary(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::primary);
    let position = pos(&pair, file);
    let inner = pair.into_inner().next().expect("primary has a child");
    match inner.as_rule() {
        Rule::float_lit => Expr {
            kind: ExprKind::LitFloat(inner.as_str().parse().expect("grammar guarantees a valid float")),
            position,
        },
        Rule::int_lit => Expr {
            kind: ExprKind::LitInt(inner.as_str().parse().expect("grammar guarantees a valid int")),
            position,
        },
        Rule::bool_lit => Expr {
            kind: ExprKind::LitBool(inner.as_str() == "True"),
            position,
        },
        Rule::none_lit => Expr {
            kind: ExprKind::LitNone,
            position,
        },
        Rule::string_lit => {
            let raw = inner.into_inner().next().expect("string_lit wraps string_inner").as_str();
            let value = unescape::unescape(raw).unwrap_or_else(|| raw.to_owned());
            Expr {
                kind: ExprKind::LitStr(value),
                position,
            }
        }
        Rule::dict_comprehension => parse_dict_comprehension(inner, file, position),
        Rule::set_comprehension => parse_set_comprehension(inner, file, position),
        Rule::dict_lit => {
            let pairs = inner
                .into_inner()
                .map(|p| {
                    assert_eq!(p.as_rule(), Rule::dict_pair);
                    let mut parts = p.into_inner();
                    let key = Expr::from_pair(parts.next().expect("dict_pair key"), file);
                    let value = Expr::from_pair(parts.next().expect("dict_pair value"), file);
                    (key, value)
                })
                .collect();
            Expr {
                kind: ExprKind::DictLit(pairs),
                position,
            }
        }
        Rule::set_lit => Expr {
            kind: ExprKind::SetLit(inner.into_inner().map(|p| Expr::from_pair(p, file)).collect()),
            position,
        },
        Rule::list_comprehension => parse_list_comprehension(inner, file, position),
        Rule::list_lit => Expr {
            kind: ExprKind::ListLit(inner.into_inner().map(|p| Expr::from_pair(p, file)).collect()),
            position,
        },
        Rule::paren_expr => {
            let expr = inner.into_inner().next().expect("paren_expr wraps an expr");
            Expr::from_pair(expr, file)
        }
        Rule::ident => Expr {
            kind: ExprKind::Name(inner.as_str().to_owned()),
            position,
        },
        other => unreachable!("unexpected primary child {other:?}"),
    }
}

fn parse_list_comprehension(pair: Pair<Rule>, file: &str, position: Position) -> Expr {
    let mut inner = pair.into_inner();
    let element = Expr::from_pair(inner.next().expect("list_comprehension element"), file);
    let var = inner.next().expect("list_comprehension var").as_str().to_owned();
    let iterable = Expr::from_pair(inner.next().expect("list_comprehension iterable"), file);
    let condition = inner.next().map(|p| Box::new(Expr::from_pair(p, file)));
    Expr {
        kind: ExprKind::ListComp {
            element: Box::new(element),
            var,
            iterable: Box::new(iterable),
            condition,
        },
        position,
    }
}

fn parse_set_comprehension(pair: Pair<Rule>, file: &str, position: Position) -> Expr {
    let mut inner = pair.into_inner();
    let element = Expr::from_pair(inner.next().expect("set_comprehension element"), file);
    let var = inner.next().expect("set_comprehension var").as_str().to_owned();
    let iterable = Expr::from_pair(inner.next().expect("set_comprehension iterable"), file);
    let condition = inner.next().map(|p| Box::new(Expr::from_pair(p, file)));
    Expr {
        kind: ExprKind::SetComp {
            element: Box::new(element),
            var,
            iterable: Box::new(iterable),
            condition,
        },
        position,
    }
}

fn parse_dict_comprehension(pair: Pair<Rule>, file: &str, position: Position) -> Expr {
    let mut inner = pair.into_inner();
    let key = Expr::from_pair(inner.next().expect("dict_comprehension key"), file);
    let value = Expr::from_pair(inner.next().expect("dict_comprehension value"), file);
    let var = inner.next().expect("dict_comprehension var").as_str().to_owned();
    let iterable = Expr::from_pair(inner.next().expect("dict_comprehension iterable"), file);
    let condition = inner.next().map(|p| Box::new(Expr::from_pair(p, file)));
    Expr {
        kind: ExprKind::DictComp {
            key: Box::new(key),
            value: Box::new(value),
            var,
            iterable: Box::new(iterable),
            condition,
        },
        position,
    }
}
