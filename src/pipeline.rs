//! Orchestrates phases A through E over one source file (spec.md §4,
//! §4.5, §6). Grounded on `loader/mod.rs` in the teacher, which is the
//! single place that reads a file off disk, normalizes it, and hands it to
//! the parser; this keeps that shape for a single translation unit and
//! drops the teacher's multi-module dependency resolution, which is out of
//! scope here (spec.md Non-goals: no cross-file imports between
//! user modules).
//!
//! Every call builds its own [`ContainerRegistry`] and drops it at the end
//! — nothing here is reused across runs (spec.md §9).

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::analyzer::{self, typed::TypedModule};
use crate::ast::validate;
use crate::ast::Module;
use crate::diagnostic::{rule, Diagnostic, Diagnostics};
use crate::ir::builder::IrBuilder;
use crate::ir::IrModule;
use crate::lexer::{self, CGenParser};
use crate::registry::ContainerRegistry;

pub struct PipelineResult {
    pub module: Module,
    pub typed: TypedModule,
    pub ir: IrModule,
    pub registry: ContainerRegistry,
    pub c_source: String,
}

/// Reads `path`, requiring valid UTF-8, and runs the full pipeline over its
/// contents. `\r\n`/`\r` line endings are normalized to `\n` before
/// anything else touches the source (spec.md §6).
pub fn translate_file(path: &Path) -> Result<PipelineResult, Diagnostics> {
    let file = path.to_string_lossy().into_owned();
    let bytes = fs::read(path).map_err(|err| {
        vec![Diagnostic::error(
            rule::PARSE_ERROR,
            (file.clone(), 1, 1),
            format!("could not read '{file}': {err}"),
        )]
    })?;
    let source = String::from_utf8(bytes).map_err(|_| {
        vec![Diagnostic::error(
            rule::PARSE_ERROR,
            (file.clone(), 1, 1),
            "source file is not valid UTF-8",
        )]
    })?;
    translate_source(&source, &file)
}

pub fn translate_source(source: &str, file: &str) -> Result<PipelineResult, Diagnostics> {
    info!("translating {file}");
    let source = source.replace("\r\n", "\n").replace('\r', "\n");

    let normalized = lexer::normalize_indentation(&source, file).map_err(|d| vec![d])?;
    debug!("normalized indentation for {file}");

    let pairs = CGenParser::parse_module(&normalized, file).map_err(|d| vec![d])?;
    let module = Module::from_pairs(pairs, file);
    debug!("parsed {} import(s), {} record(s), {} function(s)", module.imports.len(), module.records.len(), module.functions.len());

    validate::validate(&module)?;
    debug!("validated {file}");

    let typed = analyzer::analyze(&module)?;
    debug!("type-checked {file}");

    let mut registry = ContainerRegistry::new();
    let ir = IrBuilder::lower_module(&typed, &mut registry).map_err(|err| {
        vec![Diagnostic::error(rule::UNSUPPORTED_CONSTRUCT, (file.to_owned(), 1, 1), err.to_string())]
    })?;
    debug!("lowered {file} to IR ({} container type(s) registered)", registry.required_declarations().len());

    let import_paths: Vec<String> = module.imports.iter().map(|i| i.path.clone()).collect();
    let c_source = crate::emitter::Emitter::emit_with_imports(&ir, &registry, &import_paths);
    info!("emitted {} bytes of C for {file}", c_source.len());

    Ok(PipelineResult { module, typed, ir, registry, c_source })
}
