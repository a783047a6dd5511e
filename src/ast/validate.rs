//! The validator half of Phase A (spec.md §4.1). Everything here runs on
//! the untyped surface AST, before the analyzer (Phase B) ever sees types.
//! Grounded on `typechecker/fn_extractor.rs` in the teacher, which walks a
//! whole `Ast` collecting every error it can before giving up, rather than
//! stopping at the first one — the same posture this takes.

use std::collections::HashSet;

use crate::diagnostic::{rule, Diagnostic, Diagnostics};

use super::expr::{Expr, ExprKind};
use super::function::FunctionDecl;
use super::module::Module;
use super::ops::BinOp;
use super::record::RecordDecl;
use super::stmt::{Stmt, StmtKind};
use super::type_name::{ScalarType, TypeExpr};

/// Paths resolvable through `import` (spec.md §6's allow-list). `math`
/// additionally triggers `<math.h>` at emission time; `dataclasses` and
/// `typing` are no-ops that affect only validation. Anything else is
/// `E_BAD_IMPORT`.
const ALLOWED_IMPORTS: &[&str] = &["math", "dataclasses", "typing"];

pub fn validate(module: &Module) -> Result<(), Diagnostics> {
    let mut diagnostics = Vec::new();

    check_imports(module, &mut diagnostics);
    check_duplicate_top_level_names(module, &mut diagnostics);

    for record in &module.records {
        check_record(record, &mut diagnostics);
    }
    for function in &module.functions {
        check_function(function, &mut diagnostics);
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn check_imports(module: &Module, diagnostics: &mut Diagnostics) {
    for import in &module.imports {
        let root = import.path.split('.').next().unwrap_or(&import.path);
        if !ALLOWED_IMPORTS.contains(&root) {
            diagnostics.push(
                Diagnostic::error(
                    rule::BAD_IMPORT,
                    import.position.clone(),
                    format!("unsupported import '{}'", import.path),
                )
                .with_suggestion(format!("supported imports are: {}", ALLOWED_IMPORTS.join(", "))),
            );
        }
    }
}

fn check_duplicate_top_level_names(module: &Module, diagnostics: &mut Diagnostics) {
    let mut seen = HashSet::new();
    for record in &module.records {
        if !seen.insert(record.name.clone()) {
            diagnostics.push(Diagnostic::error(
                rule::DUPLICATE_NAME,
                record.position.clone(),
                format!("'{}' is already declared at module scope", record.name),
            ));
        }
    }
    for function in &module.functions {
        if !seen.insert(function.name.clone()) {
            diagnostics.push(Diagnostic::error(
                rule::DUPLICATE_NAME,
                function.position.clone(),
                format!("'{}' is already declared at module scope", function.name),
            ));
        }
    }
}

fn check_record(record: &RecordDecl, diagnostics: &mut Diagnostics) {
    let mut seen = HashSet::new();
    for field in &record.fields {
        if !seen.insert(field.name.clone()) {
            diagnostics.push(Diagnostic::error(
                rule::DUPLICATE_NAME,
                field.position.clone(),
                format!("duplicate field '{}' in record '{}'", field.name, record.name),
            ));
        }
        check_nested_container(&field.type_expr, &field.position, diagnostics);
    }
}

fn check_function(function: &FunctionDecl, diagnostics: &mut Diagnostics) {
    let mut seen = HashSet::new();
    for param in &function.params {
        if !seen.insert(param.name.clone()) {
            diagnostics.push(Diagnostic::error(
                rule::DUPLICATE_NAME,
                param.position.clone(),
                format!(
                    "duplicate parameter '{}' in function '{}'",
                    param.name, function.name
                ),
            ));
        }
        check_nested_container(&param.type_expr, &param.position, diagnostics);
    }
    check_nested_container(&function.return_type, &function.position, diagnostics);

    let mut declared: HashSet<String> = function.params.iter().map(|p| p.name.clone()).collect();
    check_block_declarations(&function.body.stmts, &mut declared, diagnostics);

    let returns_value = !matches!(function.return_type, TypeExpr::Scalar(ScalarType::None));
    if returns_value && !always_returns(&function.body.stmts) {
        diagnostics.push(Diagnostic::error(
            rule::MISSING_RETURN,
            function.position.clone(),
            format!(
                "function '{}' does not return a value on every path",
                function.name
            ),
        ));
    }
}

fn check_nested_container(
    type_expr: &TypeExpr,
    position: &crate::diagnostic::Position,
    diagnostics: &mut Diagnostics,
) {
    if type_expr.has_nested_container() {
        diagnostics.push(Diagnostic::error(
            rule::NESTED_CONTAINER,
            position.clone(),
            "containers of containers are not supported",
        ));
    }
}

/// Walks a function body tracking which names are in scope, flagging any
/// assignment to a name that wasn't introduced by a `decl_stmt`, a
/// parameter, or a `for`-loop binding first.
fn check_block_declarations(
    stmts: &[Stmt],
    declared: &mut HashSet<String>,
    diagnostics: &mut Diagnostics,
) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Decl { name, value, .. } => {
                check_expr_declarations(value, declared, diagnostics);
                declared.insert(name.clone());
            }
            StmtKind::Assign { target, value } => {
                check_assignment_target(target, declared, diagnostics);
                check_expr_declarations(value, declared, diagnostics);
            }
            StmtKind::AugAssign { target, value, .. } => {
                check_assignment_target(target, declared, diagnostics);
                check_expr_declarations(value, declared, diagnostics);
            }
            StmtKind::If { branches, else_branch } => {
                for (cond, body) in branches {
                    check_expr_declarations(cond, declared, diagnostics);
                    let mut scope = declared.clone();
                    check_block_declarations(body, &mut scope, diagnostics);
                }
                if let Some(body) = else_branch {
                    let mut scope = declared.clone();
                    check_block_declarations(body, &mut scope, diagnostics);
                }
            }
            StmtKind::While { condition, body } => {
                check_expr_declarations(condition, declared, diagnostics);
                let mut scope = declared.clone();
                check_block_declarations(body, &mut scope, diagnostics);
            }
            StmtKind::ForEach { var, iterable, body } => {
                check_expr_declarations(iterable, declared, diagnostics);
                let mut scope = declared.clone();
                scope.insert(var.clone());
                check_block_declarations(body, &mut scope, diagnostics);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    check_expr_declarations(value, declared, diagnostics);
                }
            }
            StmtKind::Assert(expr) | StmtKind::ExprStmt(expr) => {
                check_expr_declarations(expr, declared, diagnostics);
            }
        }
    }
}

fn check_assignment_target(
    target: &Expr,
    declared: &HashSet<String>,
    diagnostics: &mut Diagnostics,
) {
    match &target.kind {
        ExprKind::Name(name) => {
            if !declared.contains(name) {
                diagnostics.push(Diagnostic::error(
                    rule::UNANNOTATED_BINDING,
                    target.position.clone(),
                    format!("'{name}' is assigned before it is declared"),
                ));
            }
        }
        ExprKind::Field(base, _) => check_expr_declarations(base, declared, diagnostics),
        ExprKind::Index(base, index) => {
            check_expr_declarations(base, declared, diagnostics);
            check_expr_declarations(index, declared, diagnostics);
        }
        _ => {}
    }
}

fn check_expr_declarations(expr: &Expr, declared: &HashSet<String>, diagnostics: &mut Diagnostics) {
    match &expr.kind {
        ExprKind::Name(name) => {
            if !declared.contains(name) {
                diagnostics.push(Diagnostic::error(
                    rule::UNANNOTATED_BINDING,
                    expr.position.clone(),
                    format!("use of undeclared name '{name}'"),
                ));
            }
        }
        ExprKind::Binary(op, lhs, rhs) => {
            check_expr_declarations(lhs, declared, diagnostics);
            check_expr_declarations(rhs, declared, diagnostics);
            let _ = op;
        }
        ExprKind::Unary(_, operand) => check_expr_declarations(operand, declared, diagnostics),
        ExprKind::Index(base, index) => {
            check_expr_declarations(base, declared, diagnostics);
            check_expr_declarations(index, declared, diagnostics);
        }
        ExprKind::Slice(base, start, end) => {
            check_expr_declarations(base, declared, diagnostics);
            check_expr_declarations(start, declared, diagnostics);
            check_expr_declarations(end, declared, diagnostics);
        }
        ExprKind::Field(base, _) => check_expr_declarations(base, declared, diagnostics),
        ExprKind::Call(callee, args) => {
            check_expr_declarations(callee, declared, diagnostics);
            for arg in args {
                check_expr_declarations(arg, declared, diagnostics);
            }
        }
        ExprKind::MethodCall(receiver, _, args) => {
            check_expr_declarations(receiver, declared, diagnostics);
            for arg in args {
                check_expr_declarations(arg, declared, diagnostics);
            }
        }
        ExprKind::ListLit(items) | ExprKind::SetLit(items) => {
            for item in items {
                check_expr_declarations(item, declared, diagnostics);
            }
        }
        ExprKind::DictLit(pairs) => {
            for (key, value) in pairs {
                check_expr_declarations(key, declared, diagnostics);
                check_expr_declarations(value, declared, diagnostics);
            }
        }
        ExprKind::ListComp { element, var, iterable, condition }
        | ExprKind::SetComp { element, var, iterable, condition } => {
            check_expr_declarations(iterable, declared, diagnostics);
            let mut scope = declared.clone();
            scope.insert(var.clone());
            check_expr_declarations(element, &scope, diagnostics);
            if let Some(condition) = condition {
                check_expr_declarations(condition, &scope, diagnostics);
            }
        }
        ExprKind::DictComp { key, value, var, iterable, condition } => {
            check_expr_declarations(iterable, declared, diagnostics);
            let mut scope = declared.clone();
            scope.insert(var.clone());
            check_expr_declarations(key, &scope, diagnostics);
            check_expr_declarations(value, &scope, diagnostics);
            if let Some(condition) = condition {
                check_expr_declarations(condition, &scope, diagnostics);
            }
        }
        ExprKind::LitInt(_)
        | ExprKind::LitFloat(_)
        | ExprKind::LitBool(_)
        | ExprKind::LitStr(_)
        | ExprKind::LitNone => {}
    }
}

/// True if every control path through `stmts` ends in a `return`. Used for
/// `E_MISSING_RETURN` (spec.md §3 invariant 4). `while`/`for` bodies never
/// count even when they look exhaustive — the analyzer can't prove they run
/// at least once.
fn always_returns(stmts: &[Stmt]) -> bool {
    match stmts.last() {
        Some(stmt) => match &stmt.kind {
            StmtKind::Return(_) => true,
            StmtKind::If { branches, else_branch } => {
                let Some(else_branch) = else_branch else {
                    return false;
                };
                branches.iter().all(|(_, body)| always_returns(body)) && always_returns(else_branch)
            }
            _ => false,
        },
        None => false,
    }
}

/// Binary-modulo on a float operand has no portable C11 equivalent without
/// pulling in `fmod`, which this dialect doesn't expose (spec.md §9 open
/// question 2). Exposed for the analyzer, which has the type information
/// needed to know an operand actually is a float.
pub fn is_modulo(op: BinOp) -> bool {
    matches!(op, BinOp::Mod)
}
