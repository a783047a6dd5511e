//! Statements. Grounded on `ast/statement.rs` in the teacher, which wraps
//! one `enum` per statement kind behind a position-carrying outer type.

use pest::iterators::Pair;

use super::expr::Expr;
use super::ops::AugOp;
use super::type_name::TypeExpr;
use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Decl {
        name: String,
        type_expr: TypeExpr,
        value: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: AugOp,
        value: Expr,
    },
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    ForEach {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Assert(Expr),
    ExprStmt(Expr),
}

fn pos(pair: &Pair<Rule>, file: &str) -> Position {
    let (line, col) = pair.as_span().start_pos().line_col();
    (file.to_owned(), line, col)
}

fn stmts_of_block(pair: Pair<Rule>, file: &str) -> Vec<Stmt> {
    assert_eq!(pair.as_rule(), Rule::block);
    pair.into_inner().map(|p| Stmt::from_pair(p, file)).collect()
}

impl Stmt {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Stmt {
        assert_eq!(pair.as_rule(), Rule::stmt);
        let position = pos(&pair, file);
        let inner = pair.into_inner().next().expect("stmt wraps a concrete kind");
        let kind = match inner.as_rule() {
            Rule::if_stmt => parse_if(inner, file),
            Rule::while_stmt => parse_while(inner, file),
            Rule::for_stmt => parse_for(inner, file),
            Rule::return_stmt => {
                let value = inner.into_inner().next().map(|p| Expr::from_pair(p, file));
                StmtKind::Return(value)
            }
            Rule::assert_stmt => {
                let expr = inner.into_inner().next().expect("assert_stmt has an expr");
                StmtKind::Assert(Expr::from_pair(expr, file))
            }
            Rule::decl_stmt => {
                let mut parts = inner.into_inner();
                let name = parts.next().expect("decl_stmt has a name").as_str().to_owned();
                let type_expr = TypeExpr::from_pair(parts.next().expect("decl_stmt has a type_name"));
                let value = Expr::from_pair(parts.next().expect("decl_stmt has a value"), file);
                StmtKind::Decl { name, type_expr, value }
            }
            Rule::assign_stmt => {
                let mut parts = inner.into_inner();
                let target = parse_postfix_target(parts.next().expect("assign_stmt has a target"), file);
                let value = Expr::from_pair(parts.next().expect("assign_stmt has a value"), file);
                StmtKind::Assign { target, value }
            }
            Rule::aug_assign_stmt => {
                let mut parts = inner.into_inner();
                let target = parse_postfix_target(parts.next().expect("aug_assign_stmt has a target"), file);
                let op = AugOp::from_token(parts.next().expect("aug_assign_stmt has an op").as_str());
                let value = Expr::from_pair(parts.next().expect("aug_assign_stmt has a value"), file);
                StmtKind::AugAssign { target, op, value }
            }
            Rule::expr_stmt => {
                let target = inner.into_inner().next().expect("expr_stmt has a postfix_expr");
                StmtKind::ExprStmt(parse_postfix_target(target, file))
            }
            other => unreachable!("unexpected stmt child {other:?}"),
        };
        Stmt { kind, position }
    }
}

/// `assign_stmt`/`aug_assign_stmt`/`expr_stmt` all capture a bare
/// `postfix_expr` rather than the full `expr` rule (assignment targets and
/// bare-call statements don't need the binary-operator cascade), so this
/// reuses the same `postfix_expr` parser the `expr` chain bottoms out at.
fn parse_postfix_target(pair: Pair<Rule>, file: &str) -> Expr {
    assert_eq!(pair.as_rule(), Rule::postfix_expr);
    super::expr::parse_postfix_expr_standalone(pair, file)
}

fn parse_if(pair: Pair<Rule>, file: &str) -> StmtKind {
    let mut inner = pair.into_inner();
    let mut branches = Vec::new();

    let cond = Expr::from_pair(inner.next().expect("if_stmt has a condition"), file);
    let body = stmts_of_block(inner.next().expect("if_stmt has a block"), file);
    branches.push((cond, body));

    let mut else_branch = None;
    for part in inner {
        match part.as_rule() {
            Rule::elif_clause => {
                let mut elif_parts = part.into_inner();
                let cond = Expr::from_pair(elif_parts.next().expect("elif_clause has a condition"), file);
                let body = stmts_of_block(elif_parts.next().expect("elif_clause has a block"), file);
                branches.push((cond, body));
            }
            Rule::else_clause => {
                let block = part.into_inner().next().expect("else_clause has a block");
                else_branch = Some(stmts_of_block(block, file));
            }
            other => unreachable!("unexpected if_stmt trailing child {other:?}"),
        }
    }

    StmtKind::If { branches, else_branch }
}

fn parse_while(pair: Pair<Rule>, file: &str) -> StmtKind {
    let mut inner = pair.into_inner();
    let condition = Expr::from_pair(inner.next().expect("while_stmt has a condition"), file);
    let body = stmts_of_block(inner.next().expect("while_stmt has a block"), file);
    StmtKind::While { condition, body }
}

fn parse_for(pair: Pair<Rule>, file: &str) -> StmtKind {
    let mut inner = pair.into_inner();
    let var = inner.next().expect("for_stmt has a var").as_str().to_owned();
    let iterable = Expr::from_pair(inner.next().expect("for_stmt has an iterable"), file);
    let body = stmts_of_block(inner.next().expect("for_stmt has a block"), file);
    StmtKind::ForEach { var, iterable, body }
}
