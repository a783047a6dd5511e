//! Statement codegen. One `write_*` per [`IrStmtKind`] variant, pushed
//! straight into the shared [`Emitter`] buffer at the current indent.

use crate::analyzer::ctype::CType;
use crate::ir::{IrExpr, IrExprKind, IrStmt, IrStmtKind};
use crate::registry::{derived_name, mangle_container, ContainerRegistry};

use super::expr::{write_aug_assign_value, write_expr};
use super::types::c_type_name;
use super::Emitter;

pub fn write_stmt(emitter: &mut Emitter, stmt: &IrStmt, registry: &ContainerRegistry) {
    match &stmt.kind {
        IrStmtKind::Decl { name, c_type, value } => {
            emitter.push_line(&format!("{} {name} = {};", c_type_name(c_type), write_expr(value)));
        }
        IrStmtKind::Assign { target, value } => write_assign(emitter, target, value),
        IrStmtKind::AugAssign { target, op, value } => {
            let rhs = write_aug_assign_value(*op, target, value);
            emitter.push_line(&format!("{} = {rhs};", write_expr(target)));
        }
        IrStmtKind::If { branches, else_branch } => write_if(emitter, branches, else_branch, registry),
        IrStmtKind::While { condition, body } => {
            emitter.push_line(&format!("while ({}) {{", write_expr(condition)));
            emitter.indent_in();
            for s in body {
                write_stmt(emitter, s, registry);
            }
            emitter.indent_out();
            emitter.push_line("}");
        }
        IrStmtKind::ForRange { var, start, stop, step, body } => {
            emitter.push_line(&format!(
                "for (int64_t {var} = {}; {var} < {}; {var} += {}) {{",
                write_expr(start),
                write_expr(stop),
                write_expr(step)
            ));
            emitter.indent_in();
            for s in body {
                write_stmt(emitter, s, registry);
            }
            emitter.indent_out();
            emitter.push_line("}");
        }
        IrStmtKind::ForEach { var, var_type, iterable, body } => {
            write_for_each(emitter, var, var_type, iterable, body, registry);
        }
        IrStmtKind::Return(value) => match value {
            Some(expr) => emitter.push_line(&format!("return {};", write_expr(expr))),
            None => emitter.push_line("return;"),
        },
        IrStmtKind::Assert(expr) => {
            emitter.push_line(&format!("cgen_assert({}, \"assertion failed\");", write_expr(expr)));
        }
        IrStmtKind::ExprStmt(expr) => {
            emitter.push_line(&format!("{};", write_expr(expr)));
        }
    }
}

/// `c[i] = v` on a dict has no addressable slot for a missing key, so it
/// can't write through a pointer the way a list element assignment does —
/// it must call the insert op instead (spec.md §4.4's write row).
fn write_assign(emitter: &mut Emitter, target: &IrExpr, value: &IrExpr) {
    if let IrExprKind::Index(base, index, receiver) = &target.kind {
        if matches!(base.c_type, CType::Dict(_, _)) {
            emitter.push_line(&format!(
                "{}(&{}, {}, {});",
                derived_name(receiver, "insert"),
                write_expr(base),
                write_expr(index),
                write_expr(value)
            ));
            return;
        }
    }
    emitter.push_line(&format!("{} = {};", write_expr(target), write_expr(value)));
}

fn write_if(
    emitter: &mut Emitter,
    branches: &[(IrExpr, Vec<IrStmt>)],
    else_branch: &Option<Vec<IrStmt>>,
    registry: &ContainerRegistry,
) {
    for (idx, (cond, body)) in branches.iter().enumerate() {
        let keyword = if idx == 0 { "if" } else { "} else if" };
        emitter.push_line(&format!("{keyword} ({}) {{", write_expr(cond)));
        emitter.indent_in();
        for s in body {
            write_stmt(emitter, s, registry);
        }
        emitter.indent_out();
    }
    if let Some(body) = else_branch {
        emitter.push_line("} else {");
        emitter.indent_in();
        for s in body {
            write_stmt(emitter, s, registry);
        }
        emitter.indent_out();
    }
    emitter.push_line("}");
}

fn write_for_each(
    emitter: &mut Emitter,
    var: &str,
    var_type: &crate::analyzer::ctype::CType,
    iterable: &IrExpr,
    body: &[IrStmt],
    registry: &ContainerRegistry,
) {
    let mangled = mangle_container(&iterable.c_type);
    let cursor = format!("{var}_i");
    emitter.push_line(&format!(
        "for (size_t {cursor} = 0; {cursor} < {mangled}_len(&{}); {cursor}++) {{",
        write_expr(iterable)
    ));
    emitter.indent_in();
    emitter.push_line(&format!(
        "{} {var} = {mangled}_at(&{}, {cursor});",
        c_type_name(var_type),
        write_expr(iterable)
    ));
    for s in body {
        write_stmt(emitter, s, registry);
    }
    emitter.indent_out();
    emitter.push_line("}");
}
