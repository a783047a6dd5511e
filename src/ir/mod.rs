//! Phase C: the IR handed to the emitter. Structurally close to the typed
//! tree Phase B produces, but concrete rather than shared through a
//! generic parameter (unlike the teacher's `Statement<T>`/`info: T`
//! pattern) — comprehensions are gone by this point, desugared by
//! [`builder::IrBuilder`] into an initializer plus a populating loop, so one
//! typed statement can become several IR statements. A generic tree shared
//! between the typed and IR stages can't express that without either losing
//! the one-to-many relationship or smuggling a `Vec` into the generic slot,
//! so this keeps its own node types instead.

pub mod builder;

use crate::analyzer::ctype::CType;
use crate::ast::{AugOp, BinOp, UnOp};
use crate::diagnostic::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct IrModule {
    pub records: Vec<IrRecord>,
    pub functions: Vec<IrFunction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrRecord {
    pub name: String,
    pub mutable: bool,
    pub fields: Vec<(String, CType)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<(String, CType)>,
    pub return_type: CType,
    pub body: Vec<IrStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrStmt {
    pub kind: IrStmtKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrStmtKind {
    Decl { name: String, c_type: CType, value: IrExpr },
    Assign { target: IrExpr, value: IrExpr },
    AugAssign { target: IrExpr, op: AugOp, value: IrExpr },
    If { branches: Vec<(IrExpr, Vec<IrStmt>)>, else_branch: Option<Vec<IrStmt>> },
    While { condition: IrExpr, body: Vec<IrStmt> },
    ForEach { var: String, var_type: CType, iterable: IrExpr, body: Vec<IrStmt> },
    ForRange { var: String, start: IrExpr, stop: IrExpr, step: IrExpr, body: Vec<IrStmt> },
    Return(Option<IrExpr>),
    Assert(IrExpr),
    ExprStmt(IrExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrExpr {
    pub kind: IrExprKind,
    pub c_type: CType,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrExprKind {
    LitInt(i64),
    LitFloat(f64),
    LitBool(bool),
    LitStr(String),
    LitNone,
    Name(String),
    Binary(BinOp, Box<IrExpr>, Box<IrExpr>),
    Unary(UnOp, Box<IrExpr>),
    /// The trailing `String` is the per-variable derived receiver identifier
    /// (spec.md §4.4, §9 "per-variable derived names") — e.g. `numbers` for
    /// `numbers[i]` — combined with an operation suffix at emission time via
    /// [`crate::registry::derived_name`].
    Index(Box<IrExpr>, Box<IrExpr>, String),
    Slice(Box<IrExpr>, Box<IrExpr>, Box<IrExpr>),
    Field(Box<IrExpr>, String),
    Call(String, Vec<IrExpr>),
    /// `(base, receiver, method, args)` — `receiver` is the per-variable
    /// derived identifier, `method` the closed operation tag (push/add/...).
    ContainerOp(Box<IrExpr>, String, String, Vec<IrExpr>),
    /// `(receiver, items)`. `receiver` is the bound variable's name when
    /// the literal is a declaration's direct initializer, or a type-mangled
    /// fallback otherwise (e.g. a literal nested in another expression).
    ListLit(String, Vec<IrExpr>),
    SetLit(String, Vec<IrExpr>),
    DictLit(String, Vec<(IrExpr, IrExpr)>),
}
