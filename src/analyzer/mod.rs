//! Phase B: type and usage analysis (spec.md §4.2). Two passes: first
//! collect every record's and function's *signature* (so forward
//! references between top-level items resolve regardless of declaration
//! order), then walk each function body checking and annotating it against
//! those signatures. Grounded on `typechecker/fn_extractor.rs` (the
//! signature-collection pass) and `typechecker/mod.rs` (the body walk) in
//! the teacher.

pub mod ctype;
pub mod error;
pub mod scope;
pub mod typed;

use std::collections::HashMap;
use std::collections::HashSet;

use crate::ast::{self, AugOp, BinOp, Expr, ExprKind, FunctionDecl, Module, RecordDecl, Stmt, StmtKind, UnOp};
use crate::ast::validate::is_modulo;
use crate::diagnostic::{rule, Diagnostic, Diagnostics};

use ctype::CType;
use scope::Scope;
use typed::{TypedExpr, TypedExprKind, TypedFunction, TypedModule, TypedRecord, TypedStmt, TypedStmtKind};

struct FnSig {
    params: Vec<CType>,
    return_type: CType,
}

struct Analyzer<'a> {
    record_names: HashSet<String>,
    records: HashMap<String, &'a RecordDecl>,
    record_ctypes: HashMap<String, Vec<(String, CType)>>,
    functions: HashMap<String, FnSig>,
    diagnostics: Diagnostics,
}

pub fn analyze(module: &Module) -> Result<TypedModule, Diagnostics> {
    let record_names: HashSet<String> = module.records.iter().map(|r| r.name.clone()).collect();
    let mut analyzer = Analyzer {
        record_names,
        records: module.records.iter().map(|r| (r.name.clone(), r)).collect(),
        record_ctypes: HashMap::new(),
        functions: HashMap::new(),
        diagnostics: Vec::new(),
    };

    analyzer.collect_record_signatures(module);
    analyzer.collect_function_signatures(module);

    let typed_records = module
        .records
        .iter()
        .map(|r| TypedRecord {
            name: r.name.clone(),
            mutable: r.mutable,
            fields: analyzer.record_ctypes.get(&r.name).cloned().unwrap_or_default(),
        })
        .collect();

    let typed_functions = module
        .functions
        .iter()
        .filter_map(|f| analyzer.analyze_function(f))
        .collect();

    if analyzer.diagnostics.is_empty() {
        Ok(TypedModule {
            records: typed_records,
            functions: typed_functions,
        })
    } else {
        Err(analyzer.diagnostics)
    }
}

impl<'a> Analyzer<'a> {
    fn resolve(&mut self, type_expr: &ast::TypeExpr, position: &crate::diagnostic::Position) -> CType {
        match CType::resolve(type_expr, &self.record_names) {
            Some(ty) => ty,
            None => {
                let name = match type_expr {
                    ast::TypeExpr::Named(name) => name.clone(),
                    _ => "<unknown>".to_owned(),
                };
                self.diagnostics.push(error::unresolved_type(position.clone(), &name));
                CType::None
            }
        }
    }

    fn collect_record_signatures(&mut self, module: &Module) {
        for record in &module.records {
            let fields = record
                .fields
                .iter()
                .map(|f| (f.name.clone(), self.resolve(&f.type_expr, &f.position)))
                .collect();
            self.record_ctypes.insert(record.name.clone(), fields);
        }
    }

    fn collect_function_signatures(&mut self, module: &Module) {
        for function in &module.functions {
            let params = function
                .params
                .iter()
                .map(|p| self.resolve(&p.type_expr, &p.position))
                .collect();
            let return_type = self.resolve(&function.return_type, &function.position);
            self.functions
                .insert(function.name.clone(), FnSig { params, return_type });
        }
    }

    fn field_type(&self, record: &str, field: &str) -> Option<CType> {
        self.record_ctypes
            .get(record)?
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, ty)| ty.clone())
    }

    fn is_mutable_record(&self, record: &str) -> bool {
        self.records.get(record).map(|r| r.mutable).unwrap_or(false)
    }

    fn analyze_function(&mut self, function: &FunctionDecl) -> Option<TypedFunction> {
        let sig_return = self.resolve(&function.return_type, &function.position);
        let mut scope = Scope::new();
        let typed_params: Vec<(String, CType)> = function
            .params
            .iter()
            .map(|p| {
                let ty = self.resolve(&p.type_expr, &p.position);
                scope.declare(&p.name, ty.clone());
                (p.name.clone(), ty)
            })
            .collect();

        let body = self.analyze_block(&function.body.stmts, &mut scope, &sig_return);

        Some(TypedFunction {
            name: function.name.clone(),
            params: typed_params,
            return_type: sig_return,
            body,
        })
    }

    fn analyze_block(
        &mut self,
        stmts: &[Stmt],
        scope: &mut Scope,
        expected_return: &CType,
    ) -> Vec<TypedStmt> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            if let Some(typed) = self.analyze_stmt(stmt, scope, expected_return) {
                out.push(typed);
            }
        }
        out
    }

    fn analyze_stmt(
        &mut self,
        stmt: &Stmt,
        scope: &mut Scope,
        expected_return: &CType,
    ) -> Option<TypedStmt> {
        let kind = match &stmt.kind {
            StmtKind::Decl { name, type_expr, value } => {
                let declared = self.resolve(type_expr, &stmt.position);
                let mut value = self.infer_expr(value, scope);
                if is_empty_container_literal(&value) {
                    value.c_type = declared.clone();
                }
                self.expect_assignable(&declared, &value.c_type, &stmt.position);
                scope.declare(name, declared.clone());
                TypedStmtKind::Decl {
                    name: name.clone(),
                    c_type: declared,
                    value,
                }
            }
            StmtKind::Assign { target, value } => {
                let target_typed = self.infer_expr(target, scope);
                let value_typed = self.infer_expr(value, scope);
                self.expect_assignable(&target_typed.c_type, &value_typed.c_type, &stmt.position);
                self.check_mutable_target(&target_typed, &stmt.position);
                TypedStmtKind::Assign { target: target_typed, value: value_typed }
            }
            StmtKind::AugAssign { target, op, value } => {
                let target_typed = self.infer_expr(target, scope);
                let value_typed = self.infer_expr(value, scope);
                self.check_arith(*op, &target_typed, &value_typed, &stmt.position);
                self.check_mutable_target(&target_typed, &stmt.position);
                TypedStmtKind::AugAssign {
                    target: target_typed,
                    op: *op,
                    value: value_typed,
                }
            }
            StmtKind::If { branches, else_branch } => {
                let branches = branches
                    .iter()
                    .map(|(cond, body)| {
                        let cond = self.infer_expr(cond, scope);
                        scope.push();
                        let body = self.analyze_block(body, scope, expected_return);
                        scope.pop();
                        (cond, body)
                    })
                    .collect();
                let else_branch = else_branch.as_ref().map(|body| {
                    scope.push();
                    let body = self.analyze_block(body, scope, expected_return);
                    scope.pop();
                    body
                });
                TypedStmtKind::If { branches, else_branch }
            }
            StmtKind::While { condition, body } => {
                let condition = self.infer_expr(condition, scope);
                scope.push();
                let body = self.analyze_block(body, scope, expected_return);
                scope.pop();
                TypedStmtKind::While { condition, body }
            }
            StmtKind::ForEach { var, iterable, body } => {
                return Some(self.analyze_for(var, iterable, body, scope, expected_return, &stmt.position));
            }
            StmtKind::Return(value) => {
                let value = value.as_ref().map(|v| self.infer_expr(v, scope));
                let found = value.as_ref().map(|v| v.c_type.clone()).unwrap_or(CType::None);
                self.expect_assignable(expected_return, &found, &stmt.position);
                TypedStmtKind::Return(value)
            }
            StmtKind::Assert(expr) => TypedStmtKind::Assert(self.infer_expr(expr, scope)),
            StmtKind::ExprStmt(expr) => TypedStmtKind::ExprStmt(self.infer_expr(expr, scope)),
        };
        Some(TypedStmt { kind, position: stmt.position.clone() })
    }

    /// `for x in range(...)` lowers differently from `for x in <container>`,
    /// so it's distinguished here (by callee name) rather than left for the
    /// IR builder to rediscover from a typed `Call` node.
    fn analyze_for(
        &mut self,
        var: &str,
        iterable: &Expr,
        body: &[Stmt],
        scope: &mut Scope,
        expected_return: &CType,
        position: &crate::diagnostic::Position,
    ) -> TypedStmt {
        if let ExprKind::Call(callee, args) = &iterable.kind {
            if let ExprKind::Name(name) = &callee.kind {
                if name == "range" {
                    let args: Vec<TypedExpr> = args.iter().map(|a| self.infer_expr(a, scope)).collect();
                    let (start, stop, step) = match args.len() {
                        1 => (
                            TypedExpr { kind: TypedExprKind::LitInt(0), c_type: CType::Int, position: position.clone() },
                            args[0].clone(),
                            TypedExpr { kind: TypedExprKind::LitInt(1), c_type: CType::Int, position: position.clone() },
                        ),
                        2 => (
                            args[0].clone(),
                            args[1].clone(),
                            TypedExpr { kind: TypedExprKind::LitInt(1), c_type: CType::Int, position: position.clone() },
                        ),
                        3 => (args[0].clone(), args[1].clone(), args[2].clone()),
                        _ => {
                            self.diagnostics.push(Diagnostic::error(
                                rule::UNSUPPORTED_CONSTRUCT,
                                position.clone(),
                                "range() takes between 1 and 3 arguments",
                            ));
                            (
                                TypedExpr { kind: TypedExprKind::LitInt(0), c_type: CType::Int, position: position.clone() },
                                TypedExpr { kind: TypedExprKind::LitInt(0), c_type: CType::Int, position: position.clone() },
                                TypedExpr { kind: TypedExprKind::LitInt(1), c_type: CType::Int, position: position.clone() },
                            )
                        }
                    };
                    scope.push();
                    scope.declare(var, CType::Int);
                    let body = self.analyze_block(body, scope, expected_return);
                    scope.pop();
                    return TypedStmt {
                        kind: TypedStmtKind::ForRange {
                            var: var.to_owned(),
                            start,
                            stop,
                            step,
                            body,
                        },
                        position: position.clone(),
                    };
                }
            }
        }

        let iterable_typed = self.infer_expr(iterable, scope);
        let var_type = match &iterable_typed.c_type {
            CType::List(elem) | CType::Set(elem) => (**elem).clone(),
            CType::Dict(key, _) => (**key).clone(),
            other => {
                self.diagnostics.push(error::unsupported_type(
                    position.clone(),
                    format!("'{other}' is not iterable"),
                ));
                CType::None
            }
        };
        scope.push();
        scope.declare(var, var_type.clone());
        let body = self.analyze_block(body, scope, expected_return);
        scope.pop();
        TypedStmt {
            kind: TypedStmtKind::ForEach {
                var: var.to_owned(),
                var_type,
                iterable: iterable_typed,
                body,
            },
            position: position.clone(),
        }
    }

    fn expect_assignable(&mut self, expected: &CType, found: &CType, position: &crate::diagnostic::Position) {
        if expected == found {
            return;
        }
        if matches!(expected, CType::Float) && matches!(found, CType::Int) {
            return;
        }
        self.diagnostics.push(error::type_mismatch(position.clone(), expected, found));
    }

    fn check_mutable_target(&mut self, target: &TypedExpr, position: &crate::diagnostic::Position) {
        if let TypedExprKind::Field(base, _) = &target.kind {
            if let CType::Record(name) = &base.c_type {
                if !self.is_mutable_record(name) {
                    self.diagnostics.push(error::immutable_field_assign(position.clone(), name));
                }
            }
        }
    }

    fn check_arith(&mut self, op: AugOp, target: &TypedExpr, value: &TypedExpr, position: &crate::diagnostic::Position) {
        let bin_op = op.as_bin_op();
        if is_modulo(bin_op) && (matches!(target.c_type, CType::Float) || matches!(value.c_type, CType::Float)) {
            self.diagnostics.push(error::float_modulo(position.clone()));
        }
        if !target.c_type.is_numeric() {
            self.diagnostics.push(error::type_mismatch(position.clone(), &CType::Int, &target.c_type));
        }
    }

    fn infer_expr(&mut self, expr: &Expr, scope: &Scope) -> TypedExpr {
        let position = expr.position.clone();
        let (kind, c_type) = match &expr.kind {
            ExprKind::LitInt(v) => (TypedExprKind::LitInt(*v), CType::Int),
            ExprKind::LitFloat(v) => (TypedExprKind::LitFloat(*v), CType::Float),
            ExprKind::LitBool(v) => (TypedExprKind::LitBool(*v), CType::Bool),
            ExprKind::LitStr(v) => (TypedExprKind::LitStr(v.clone()), CType::Str),
            ExprKind::LitNone => (TypedExprKind::LitNone, CType::None),
            ExprKind::Name(name) => {
                let ty = scope.lookup(name).cloned().unwrap_or_else(|| {
                    self.diagnostics.push(error::unresolved_type(position.clone(), name));
                    CType::None
                });
                (TypedExprKind::Name(name.clone()), ty)
            }
            ExprKind::Binary(op, lhs, rhs) => {
                let lhs_t = self.infer_expr(lhs, scope);
                let rhs_t = self.infer_expr(rhs, scope);
                let c_type = self.check_binary(*op, &lhs_t, &rhs_t, &position);
                (TypedExprKind::Binary(*op, Box::new(lhs_t), Box::new(rhs_t)), c_type)
            }
            ExprKind::Unary(op, operand) => {
                let operand_t = self.infer_expr(operand, scope);
                let c_type = operand_t.c_type.clone();
                (TypedExprKind::Unary(*op, Box::new(operand_t)), c_type)
            }
            ExprKind::Index(base, index) => {
                let base_t = self.infer_expr(base, scope);
                let index_t = self.infer_expr(index, scope);
                let c_type = match &base_t.c_type {
                    CType::List(elem) | CType::Set(elem) => (**elem).clone(),
                    CType::Dict(_, value) => (**value).clone(),
                    other => {
                        self.diagnostics.push(error::unsupported_type(
                            position.clone(),
                            format!("'{other}' does not support indexing"),
                        ));
                        CType::None
                    }
                };
                (TypedExprKind::Index(Box::new(base_t), Box::new(index_t)), c_type)
            }
            ExprKind::Slice(base, start, end) => {
                let base_t = self.infer_expr(base, scope);
                let start_t = self.infer_expr(start, scope);
                let end_t = self.infer_expr(end, scope);
                let c_type = base_t.c_type.clone();
                (
                    TypedExprKind::Slice(Box::new(base_t), Box::new(start_t), Box::new(end_t)),
                    c_type,
                )
            }
            ExprKind::Field(base, field) => {
                let base_t = self.infer_expr(base, scope);
                let record_name = match &base_t.c_type {
                    CType::Record(name) => Some(name.clone()),
                    _ => None,
                };
                let c_type = match &record_name {
                    Some(name) => self.field_type(name, field).unwrap_or_else(|| {
                        self.diagnostics
                            .push(error::unsupported_record_field(position.clone(), name, field));
                        CType::None
                    }),
                    None => {
                        self.diagnostics.push(error::unsupported_type(
                            position.clone(),
                            format!("'{}' is not a record", base_t.c_type),
                        ));
                        CType::None
                    }
                };
                (TypedExprKind::Field(Box::new(base_t), field.clone()), c_type)
            }
            ExprKind::Call(callee, args) => self.infer_call(callee, args, scope, &position),
            ExprKind::MethodCall(receiver, name, args) => {
                self.infer_method_call(receiver, name, args, scope, &position)
            }
            ExprKind::ListLit(items) => {
                let typed: Vec<TypedExpr> = items.iter().map(|i| self.infer_expr(i, scope)).collect();
                let elem = typed.first().map(|e| e.c_type.clone()).unwrap_or(CType::None);
                (TypedExprKind::ListLit(typed), CType::List(Box::new(elem)))
            }
            ExprKind::SetLit(items) => {
                let typed: Vec<TypedExpr> = items.iter().map(|i| self.infer_expr(i, scope)).collect();
                let elem = typed.first().map(|e| e.c_type.clone()).unwrap_or(CType::None);
                (TypedExprKind::SetLit(typed), CType::Set(Box::new(elem)))
            }
            ExprKind::DictLit(pairs) => {
                let typed: Vec<(TypedExpr, TypedExpr)> = pairs
                    .iter()
                    .map(|(k, v)| (self.infer_expr(k, scope), self.infer_expr(v, scope)))
                    .collect();
                let (key_ty, value_ty) = typed
                    .first()
                    .map(|(k, v)| (k.c_type.clone(), v.c_type.clone()))
                    .unwrap_or((CType::None, CType::None));
                (TypedExprKind::DictLit(typed), CType::Dict(Box::new(key_ty), Box::new(value_ty)))
            }
            ExprKind::ListComp { element, var, iterable, condition } => {
                let iterable_t = self.infer_expr(iterable, scope);
                let var_type = self.element_type_of(&iterable_t.c_type, &position);
                let mut inner = Scope::new();
                inner.declare(var, var_type.clone());
                let element_t = self.infer_expr_in(element, scope, &inner);
                let condition_t = condition.as_ref().map(|c| self.infer_expr_in(c, scope, &inner));
                let c_type = CType::List(Box::new(element_t.c_type.clone()));
                (
                    TypedExprKind::ListComp {
                        element: Box::new(element_t),
                        var: var.clone(),
                        var_type,
                        iterable: Box::new(iterable_t),
                        condition: condition_t.map(Box::new),
                    },
                    c_type,
                )
            }
            ExprKind::SetComp { element, var, iterable, condition } => {
                let iterable_t = self.infer_expr(iterable, scope);
                let var_type = self.element_type_of(&iterable_t.c_type, &position);
                let mut inner = Scope::new();
                inner.declare(var, var_type.clone());
                let element_t = self.infer_expr_in(element, scope, &inner);
                let condition_t = condition.as_ref().map(|c| self.infer_expr_in(c, scope, &inner));
                let c_type = CType::Set(Box::new(element_t.c_type.clone()));
                (
                    TypedExprKind::SetComp {
                        element: Box::new(element_t),
                        var: var.clone(),
                        var_type,
                        iterable: Box::new(iterable_t),
                        condition: condition_t.map(Box::new),
                    },
                    c_type,
                )
            }
            ExprKind::DictComp { key, value, var, iterable, condition } => {
                let iterable_t = self.infer_expr(iterable, scope);
                let var_type = self.element_type_of(&iterable_t.c_type, &position);
                let mut inner = Scope::new();
                inner.declare(var, var_type.clone());
                let key_t = self.infer_expr_in(key, scope, &inner);
                let value_t = self.infer_expr_in(value, scope, &inner);
                let condition_t = condition.as_ref().map(|c| self.infer_expr_in(c, scope, &inner));
                let c_type = CType::Dict(Box::new(key_t.c_type.clone()), Box::new(value_t.c_type.clone()));
                (
                    TypedExprKind::DictComp {
                        key: Box::new(key_t),
                        value: Box::new(value_t),
                        var: var.clone(),
                        var_type,
                        iterable: Box::new(iterable_t),
                        condition: condition_t.map(Box::new),
                    },
                    c_type,
                )
            }
        };
        TypedExpr { kind, c_type, position }
    }

    /// Comprehension bodies see both the enclosing scope and their own
    /// generator variable; this unions an ad-hoc inner frame onto a lookup
    /// in the outer scope without threading mutation through `Scope` itself.
    fn infer_expr_in(&mut self, expr: &Expr, outer: &Scope, inner: &Scope) -> TypedExpr {
        if let ExprKind::Name(name) = &expr.kind {
            if let Some(ty) = inner.lookup(name) {
                return TypedExpr {
                    kind: TypedExprKind::Name(name.clone()),
                    c_type: ty.clone(),
                    position: expr.position.clone(),
                };
            }
        }
        self.infer_expr(expr, outer)
    }

    fn element_type_of(&mut self, container: &CType, position: &crate::diagnostic::Position) -> CType {
        match container {
            CType::List(elem) | CType::Set(elem) => (**elem).clone(),
            CType::Dict(key, _) => (**key).clone(),
            other => {
                self.diagnostics.push(error::unsupported_type(
                    position.clone(),
                    format!("'{other}' is not iterable"),
                ));
                CType::None
            }
        }
    }

    fn check_binary(&mut self, op: BinOp, lhs: &TypedExpr, rhs: &TypedExpr, position: &crate::diagnostic::Position) -> CType {
        if is_modulo(op) && (matches!(lhs.c_type, CType::Float) || matches!(rhs.c_type, CType::Float)) {
            self.diagnostics.push(error::float_modulo(position.clone()));
        }
        if op.is_comparison() {
            return CType::Bool;
        }
        match (op, &lhs.c_type, &rhs.c_type) {
            (_, CType::Float, _) | (_, _, CType::Float) if lhs.c_type.is_numeric() && rhs.c_type.is_numeric() => {
                CType::Float
            }
            (_, CType::Int, CType::Int) => CType::Int,
            (BinOp::Add, CType::Str, CType::Str) => CType::Str,
            (BinOp::And, CType::Bool, CType::Bool) | (BinOp::Or, CType::Bool, CType::Bool) => CType::Bool,
            _ => {
                self.diagnostics
                    .push(error::type_mismatch(position.clone(), &lhs.c_type, &rhs.c_type));
                lhs.c_type.clone()
            }
        }
    }

    fn infer_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        scope: &Scope,
        position: &crate::diagnostic::Position,
    ) -> (TypedExprKind, CType) {
        let name = match &callee.kind {
            ExprKind::Name(name) => name.clone(),
            _ => {
                self.diagnostics.push(Diagnostic::error(
                    rule::UNSUPPORTED_CONSTRUCT,
                    position.clone(),
                    "calls must target a plain function name",
                ));
                "<invalid>".to_owned()
            }
        };
        let typed_args: Vec<TypedExpr> = args.iter().map(|a| self.infer_expr(a, scope)).collect();

        let c_type = match name.as_str() {
            "len" => CType::Int,
            "range" => CType::List(Box::new(CType::Int)),
            other => self
                .functions
                .get(other)
                .map(|sig| sig.return_type.clone())
                .unwrap_or_else(|| {
                    self.diagnostics.push(error::unresolved_type(position.clone(), other));
                    CType::None
                }),
        };
        (TypedExprKind::Call(name, typed_args), c_type)
    }

    fn infer_method_call(
        &mut self,
        receiver: &Expr,
        name: &str,
        args: &[Expr],
        scope: &Scope,
        position: &crate::diagnostic::Position,
    ) -> (TypedExprKind, CType) {
        let receiver_t = self.infer_expr(receiver, scope);
        let typed_args: Vec<TypedExpr> = args.iter().map(|a| self.infer_expr(a, scope)).collect();

        let c_type = match (&receiver_t.c_type, name) {
            (CType::Str, "split") => CType::List(Box::new(CType::Str)),
            (CType::List(elem), "push" | "append") => {
                let _ = elem;
                CType::None
            }
            (CType::List(elem), "pop") => (**elem).clone(),
            (CType::List(_), "contains") | (CType::Set(_), "contains") | (CType::Dict(_, _), "contains_key") => {
                CType::Bool
            }
            (CType::Set(elem), "add") => {
                let _ = elem;
                CType::None
            }
            (CType::Set(elem), "remove") => {
                let _ = elem;
                CType::None
            }
            (CType::Dict(key, value), "insert") => {
                let _ = (key, value);
                CType::None
            }
            (CType::Dict(_, value), "get") => (**value).clone(),
            (CType::Dict(key, _), "keys") => CType::List(key.clone()),
            (CType::Dict(_, value), "values") => CType::List(value.clone()),
            (other, other_name) => {
                self.diagnostics.push(error::unsupported_type(
                    position.clone(),
                    format!("'{other}' has no method '{other_name}'"),
                ));
                CType::None
            }
        };
        (TypedExprKind::ContainerOp(Box::new(receiver_t), name.to_owned(), typed_args), c_type)
    }
}

/// An empty `[]`/`{}` literal carries no element to infer a type from; its
/// `CType` is a placeholder the caller replaces with whatever the
/// declaration actually annotates.
fn is_empty_container_literal(expr: &TypedExpr) -> bool {
    match &expr.kind {
        TypedExprKind::ListLit(items) | TypedExprKind::SetLit(items) => items.is_empty(),
        TypedExprKind::DictLit(pairs) => pairs.is_empty(),
        _ => false,
    }
}
