//! Lowers a [`TypedModule`] into an [`IrModule`], registering every
//! container instantiation it finds into a [`ContainerRegistry`] along the
//! way. Grounded on `compiler/mod.rs` in the teacher, which walks a typed
//! tree once to produce its output-ready form; the one thing this builder
//! does that the teacher's doesn't is desugar comprehensions, since plain
//! C has nothing like them — `lower_stmt` returns a `Vec<IrStmt>` instead
//! of a single statement exactly so one comprehension can expand into an
//! initializer plus a populating loop.

use crate::analyzer::ctype::CType;
use crate::analyzer::typed::{
    TypedExpr, TypedExprKind, TypedFunction, TypedModule, TypedRecord, TypedStmt, TypedStmtKind,
};
use crate::diagnostic::Position;
use crate::registry::{ContainerRegistry, Provenance};

use super::{IrExpr, IrExprKind, IrFunction, IrModule, IrRecord, IrStmt, IrStmtKind};

/// Internal-invariant violation: something Phase A/B should have already
/// rejected reached the IR builder anyway. Never constructed for anything
/// a user's program can trigger through normal diagnostics.
#[derive(Debug)]
pub struct InternalError(pub String);

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "internal error: {}", self.0)
    }
}

impl std::error::Error for InternalError {}

pub struct IrBuilder;

impl IrBuilder {
    pub fn lower_module(
        module: &TypedModule,
        registry: &mut ContainerRegistry,
    ) -> Result<IrModule, InternalError> {
        let records = module
            .records
            .iter()
            .map(|r| Self::lower_record(r, registry))
            .collect();
        let functions = module
            .functions
            .iter()
            .map(|f| Self::lower_function(f, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IrModule { records, functions })
    }

    fn lower_record(record: &TypedRecord, registry: &mut ContainerRegistry) -> IrRecord {
        for (_, field_type) in &record.fields {
            registry.register(field_type, Provenance::Speculative);
        }
        IrRecord {
            name: record.name.clone(),
            mutable: record.mutable,
            fields: record.fields.clone(),
        }
    }

    fn lower_function(
        function: &TypedFunction,
        registry: &mut ContainerRegistry,
    ) -> Result<IrFunction, InternalError> {
        for (_, param_type) in &function.params {
            registry.register(param_type, Provenance::Actual);
        }
        registry.register(&function.return_type, Provenance::Actual);

        let mut body = Vec::new();
        for stmt in &function.body {
            body.extend(Self::lower_stmt(stmt, registry)?);
        }

        Ok(IrFunction {
            name: function.name.clone(),
            params: function.params.clone(),
            return_type: function.return_type.clone(),
            body,
        })
    }

    fn lower_stmt(stmt: &TypedStmt, registry: &mut ContainerRegistry) -> Result<Vec<IrStmt>, InternalError> {
        let position = stmt.position.clone();
        let stmts = match &stmt.kind {
            TypedStmtKind::Decl { name, c_type, value } => {
                registry.register(c_type, Provenance::Actual);
                if is_comprehension(value) {
                    return Self::desugar_comprehension_decl(name, c_type, value, &position, registry);
                }
                let mut value = Self::lower_expr(value, registry)?;
                bind_receiver(&mut value, name);
                vec![IrStmt {
                    kind: IrStmtKind::Decl { name: name.clone(), c_type: c_type.clone(), value },
                    position,
                }]
            }
            TypedStmtKind::Assign { target, value } => vec![IrStmt {
                kind: IrStmtKind::Assign {
                    target: Self::lower_expr(target, registry)?,
                    value: Self::lower_expr(value, registry)?,
                },
                position,
            }],
            TypedStmtKind::AugAssign { target, op, value } => vec![IrStmt {
                kind: IrStmtKind::AugAssign {
                    target: Self::lower_expr(target, registry)?,
                    op: *op,
                    value: Self::lower_expr(value, registry)?,
                },
                position,
            }],
            TypedStmtKind::If { branches, else_branch } => {
                let branches = branches
                    .iter()
                    .map(|(cond, body)| -> Result<_, InternalError> {
                        Ok((Self::lower_expr(cond, registry)?, Self::lower_block(body, registry)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let else_branch = else_branch
                    .as_ref()
                    .map(|body| Self::lower_block(body, registry))
                    .transpose()?;
                vec![IrStmt { kind: IrStmtKind::If { branches, else_branch }, position }]
            }
            TypedStmtKind::While { condition, body } => vec![IrStmt {
                kind: IrStmtKind::While {
                    condition: Self::lower_expr(condition, registry)?,
                    body: Self::lower_block(body, registry)?,
                },
                position,
            }],
            TypedStmtKind::ForEach { var, var_type, iterable, body } => vec![IrStmt {
                kind: IrStmtKind::ForEach {
                    var: var.clone(),
                    var_type: var_type.clone(),
                    iterable: Self::lower_expr(iterable, registry)?,
                    body: Self::lower_block(body, registry)?,
                },
                position,
            }],
            TypedStmtKind::ForRange { var, start, stop, step, body } => vec![IrStmt {
                kind: IrStmtKind::ForRange {
                    var: var.clone(),
                    start: Self::lower_expr(start, registry)?,
                    stop: Self::lower_expr(stop, registry)?,
                    step: Self::lower_expr(step, registry)?,
                    body: Self::lower_block(body, registry)?,
                },
                position,
            }],
            TypedStmtKind::Return(value) => vec![IrStmt {
                kind: IrStmtKind::Return(value.as_ref().map(|v| Self::lower_expr(v, registry)).transpose()?),
                position,
            }],
            TypedStmtKind::Assert(expr) => vec![IrStmt {
                kind: IrStmtKind::Assert(Self::lower_expr(expr, registry)?),
                position,
            }],
            TypedStmtKind::ExprStmt(expr) => vec![IrStmt {
                kind: IrStmtKind::ExprStmt(Self::lower_expr(expr, registry)?),
                position,
            }],
        };
        Ok(stmts)
    }

    fn lower_block(stmts: &[TypedStmt], registry: &mut ContainerRegistry) -> Result<Vec<IrStmt>, InternalError> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            out.extend(Self::lower_stmt(stmt, registry)?);
        }
        Ok(out)
    }

    /// Expands `name: c_type = [elem for var in iterable if cond]` (and the
    /// set/dict equivalents) into an empty-container declaration followed
    /// by a loop that pushes/adds/inserts into it.
    fn desugar_comprehension_decl(
        name: &str,
        c_type: &CType,
        value: &TypedExpr,
        position: &Position,
        registry: &mut ContainerRegistry,
    ) -> Result<Vec<IrStmt>, InternalError> {
        let decl = IrStmt {
            kind: IrStmtKind::Decl {
                name: name.to_owned(),
                c_type: c_type.clone(),
                value: empty_literal(name, c_type, position),
            },
            position: position.clone(),
        };

        let target = IrExpr {
            kind: IrExprKind::Name(name.to_owned()),
            c_type: c_type.clone(),
            position: position.clone(),
        };

        let (var, var_type, iterable, condition, push) = match &value.kind {
            TypedExprKind::ListComp { element, var, var_type, iterable, condition } => {
                let element = Self::lower_expr(element, registry)?;
                let push = IrStmt {
                    kind: IrStmtKind::ExprStmt(IrExpr {
                        kind: IrExprKind::ContainerOp(
                            Box::new(target.clone()),
                            name.to_owned(),
                            "push".to_owned(),
                            vec![element],
                        ),
                        c_type: CType::None,
                        position: position.clone(),
                    }),
                    position: position.clone(),
                };
                (var.clone(), var_type.clone(), iterable, condition, push)
            }
            TypedExprKind::SetComp { element, var, var_type, iterable, condition } => {
                let element = Self::lower_expr(element, registry)?;
                let push = IrStmt {
                    kind: IrStmtKind::ExprStmt(IrExpr {
                        kind: IrExprKind::ContainerOp(
                            Box::new(target.clone()),
                            name.to_owned(),
                            "add".to_owned(),
                            vec![element],
                        ),
                        c_type: CType::None,
                        position: position.clone(),
                    }),
                    position: position.clone(),
                };
                (var.clone(), var_type.clone(), iterable, condition, push)
            }
            TypedExprKind::DictComp { key, value: val, var, var_type, iterable, condition } => {
                let key = Self::lower_expr(key, registry)?;
                let val = Self::lower_expr(val, registry)?;
                let push = IrStmt {
                    kind: IrStmtKind::ExprStmt(IrExpr {
                        kind: IrExprKind::ContainerOp(
                            Box::new(target.clone()),
                            name.to_owned(),
                            "insert".to_owned(),
                            vec![key, val],
                        ),
                        c_type: CType::None,
                        position: position.clone(),
                    }),
                    position: position.clone(),
                };
                (var.clone(), var_type.clone(), iterable, condition, push)
            }
            _ => return Err(InternalError("desugar_comprehension_decl called on a non-comprehension".into())),
        };

        let body = match condition {
            Some(cond) => {
                let cond = Self::lower_expr(cond, registry)?;
                vec![IrStmt {
                    kind: IrStmtKind::If { branches: vec![(cond, vec![push])], else_branch: None },
                    position: position.clone(),
                }]
            }
            None => vec![push],
        };

        let loop_stmt = if let Some((start, stop, step)) = Self::range_bounds(iterable, registry)? {
            IrStmt {
                kind: IrStmtKind::ForRange { var, start, stop, step, body },
                position: position.clone(),
            }
        } else {
            let iterable = Self::lower_expr(iterable, registry)?;
            IrStmt {
                kind: IrStmtKind::ForEach { var, var_type, iterable, body },
                position: position.clone(),
            }
        };

        Ok(vec![decl, loop_stmt])
    }

    /// If `iterable` is a `range(...)` call, lowers its 1/2/3-argument form
    /// into explicit start/stop/step expressions, mirroring the detection
    /// already performed for `for`-statement loops in the analyzer. `range`
    /// never constructs a real container value, so a comprehension driven by
    /// it must become a counted `ForRange` rather than a `ForEach` over a
    /// nonexistent container.
    fn range_bounds(
        iterable: &TypedExpr,
        registry: &mut ContainerRegistry,
    ) -> Result<Option<(IrExpr, IrExpr, IrExpr)>, InternalError> {
        let TypedExprKind::Call(name, args) = &iterable.kind else {
            return Ok(None);
        };
        if name != "range" {
            return Ok(None);
        }

        let position = &iterable.position;
        let lit_int = |v: i64| IrExpr { kind: IrExprKind::LitInt(v), c_type: CType::Int, position: position.clone() };
        let args = args.iter().map(|a| Self::lower_expr(a, registry)).collect::<Result<Vec<_>, _>>()?;

        let bounds = match args.len() {
            1 => (lit_int(0), args[0].clone(), lit_int(1)),
            2 => (args[0].clone(), args[1].clone(), lit_int(1)),
            3 => (args[0].clone(), args[1].clone(), args[2].clone()),
            _ => return Err(InternalError("range() takes between 1 and 3 arguments".into())),
        };
        Ok(Some(bounds))
    }

    fn lower_expr(expr: &TypedExpr, registry: &mut ContainerRegistry) -> Result<IrExpr, InternalError> {
        registry.register(&expr.c_type, Provenance::Actual);
        let position = expr.position.clone();
        let kind = match &expr.kind {
            TypedExprKind::LitInt(v) => IrExprKind::LitInt(*v),
            TypedExprKind::LitFloat(v) => IrExprKind::LitFloat(*v),
            TypedExprKind::LitBool(v) => IrExprKind::LitBool(*v),
            TypedExprKind::LitStr(v) => IrExprKind::LitStr(v.clone()),
            TypedExprKind::LitNone => IrExprKind::LitNone,
            TypedExprKind::Name(name) => IrExprKind::Name(name.clone()),
            TypedExprKind::Binary(op, lhs, rhs) => IrExprKind::Binary(
                *op,
                Box::new(Self::lower_expr(lhs, registry)?),
                Box::new(Self::lower_expr(rhs, registry)?),
            ),
            TypedExprKind::Unary(op, operand) => {
                IrExprKind::Unary(*op, Box::new(Self::lower_expr(operand, registry)?))
            }
            TypedExprKind::Index(base, index) => {
                let base = Self::lower_expr(base, registry)?;
                let index = Self::lower_expr(index, registry)?;
                let receiver = receiver_name(&base);
                IrExprKind::Index(Box::new(base), Box::new(index), receiver)
            }
            TypedExprKind::Slice(base, start, end) => IrExprKind::Slice(
                Box::new(Self::lower_expr(base, registry)?),
                Box::new(Self::lower_expr(start, registry)?),
                Box::new(Self::lower_expr(end, registry)?),
            ),
            TypedExprKind::Field(base, field) => {
                IrExprKind::Field(Box::new(Self::lower_expr(base, registry)?), field.clone())
            }
            TypedExprKind::Call(name, args) => IrExprKind::Call(
                name.clone(),
                args.iter().map(|a| Self::lower_expr(a, registry)).collect::<Result<_, _>>()?,
            ),
            TypedExprKind::ContainerOp(base, method, args) => {
                let base = Self::lower_expr(base, registry)?;
                let receiver = receiver_name(&base);
                let args = args.iter().map(|a| Self::lower_expr(a, registry)).collect::<Result<_, _>>()?;
                IrExprKind::ContainerOp(Box::new(base), receiver, method.clone(), args)
            }
            TypedExprKind::ListLit(items) => {
                let items = items.iter().map(|i| Self::lower_expr(i, registry)).collect::<Result<_, _>>()?;
                IrExprKind::ListLit(crate::registry::mangle_container(&expr.c_type), items)
            }
            TypedExprKind::SetLit(items) => {
                let items = items.iter().map(|i| Self::lower_expr(i, registry)).collect::<Result<_, _>>()?;
                IrExprKind::SetLit(crate::registry::mangle_container(&expr.c_type), items)
            }
            TypedExprKind::DictLit(pairs) => {
                let mut out = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    out.push((Self::lower_expr(k, registry)?, Self::lower_expr(v, registry)?));
                }
                IrExprKind::DictLit(crate::registry::mangle_container(&expr.c_type), out)
            }
            TypedExprKind::ListComp { .. } | TypedExprKind::SetComp { .. } | TypedExprKind::DictComp { .. } => {
                return Err(InternalError(
                    "comprehensions are only supported as the direct value of a declaration".into(),
                ));
            }
        };
        Ok(IrExpr { kind, c_type: expr.c_type.clone(), position })
    }
}

fn is_comprehension(expr: &TypedExpr) -> bool {
    matches!(
        expr.kind,
        TypedExprKind::ListComp { .. } | TypedExprKind::SetComp { .. } | TypedExprKind::DictComp { .. }
    )
}

/// The per-variable derived identifier a container operation's receiver
/// mangles to (spec.md §4.4, §9): a plain name or field access yields that
/// name directly; anything else (e.g. a chained index) falls back to the
/// type-mangled name, since there's no single bound identifier to derive
/// from.
fn receiver_name(expr: &IrExpr) -> String {
    match &expr.kind {
        IrExprKind::Name(name) => name.clone(),
        IrExprKind::Field(_, field) => field.clone(),
        IrExprKind::Index(base, _, _) => receiver_name(base),
        _ => crate::registry::mangle_container(&expr.c_type),
    }
}

/// Overrides a freshly-lowered container literal's receiver with the name
/// of the declaration it directly initializes, so `numbers: list<int> = []`
/// mangles its constructor call from `numbers`, not the container's type.
fn bind_receiver(expr: &mut IrExpr, name: &str) {
    match &mut expr.kind {
        IrExprKind::ListLit(receiver, _) | IrExprKind::SetLit(receiver, _) | IrExprKind::DictLit(receiver, _) => {
            *receiver = name.to_owned();
        }
        _ => {}
    }
}

fn empty_literal(name: &str, c_type: &CType, position: &Position) -> IrExpr {
    let kind = match c_type {
        CType::List(_) => IrExprKind::ListLit(name.to_owned(), vec![]),
        CType::Set(_) => IrExprKind::SetLit(name.to_owned(), vec![]),
        CType::Dict(_, _) => IrExprKind::DictLit(name.to_owned(), vec![]),
        _ => IrExprKind::LitNone,
    };
    IrExpr { kind, c_type: c_type.clone(), position: position.clone() }
}
