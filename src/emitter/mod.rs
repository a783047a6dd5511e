//! Phase E: the emitter. Walks an [`IrModule`] and a finished
//! [`ContainerRegistry`] and writes portable C11 source text. Grounded on
//! `compiler/mod.rs` in the teacher, which decomposes a single `compile`
//! entry point into one `write_*` method per node kind, writing into a
//! shared buffer rather than building and returning intermediate strings —
//! this keeps the same shape, swapping the teacher's x86 assembly buffer
//! for a `String` that implements `std::fmt::Write`.

pub mod expr;
pub mod stmt;
pub mod types;

use std::fmt::Write as _;

use crate::ir::IrModule;
use crate::registry::ContainerRegistry;

/// Tracks the current brace-nesting depth so every line can be prefixed
/// with the right number of four-space indents, the way
/// `compiler/mod.rs`'s cursor tracks byte offsets for its own output.
pub struct Indent(usize);

impl Indent {
    pub fn new() -> Indent {
        Indent(0)
    }

    pub fn push(&mut self) {
        self.0 += 1;
    }

    pub fn pop(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    pub fn write(&self, out: &mut String) {
        for _ in 0..self.0 {
            out.push_str("    ");
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Emitter {
    out: String,
    indent: Indent,
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter { out: String::new(), indent: Indent::new() }
    }

    pub fn emit(module: &IrModule, registry: &ContainerRegistry) -> String {
        Self::emit_with_imports(module, registry, &[])
    }

    /// `imports` is the module's raw import paths (spec.md §6's
    /// allow-list); only `math` changes emission, by adding `<math.h>`.
    /// `dataclasses` and `typing` affect validation only, per spec.
    pub fn emit_with_imports(module: &IrModule, registry: &ContainerRegistry, imports: &[String]) -> String {
        let mut emitter = Emitter::new();
        emitter.write_module(module, registry, imports);
        emitter.out
    }

    fn line(&mut self, text: &str) {
        self.indent.write(&mut self.out);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn write_module(&mut self, module: &IrModule, registry: &ContainerRegistry, imports: &[String]) {
        self.write_includes(registry, imports);
        self.out.push('\n');
        self.write_container_declarations(registry);
        if !registry.is_empty() {
            self.out.push('\n');
        }
        self.write_records(module);
        self.write_functions(module, registry);
    }

    /// `<stdio.h>` and `<stdbool.h>` are fixed (spec.md §4.6 item 1).
    /// `<stddef.h>`, `<stdint.h>`, `<string.h>`, and the runtime header are
    /// required unconditionally by the emitted code itself (`int64_t`,
    /// `size_t`, `strcmp`) regardless of which imports the source names.
    /// `<math.h>` is added only when `math` is imported.
    fn write_includes(&mut self, registry: &ContainerRegistry, imports: &[String]) {
        self.line("#include <stdio.h>");
        self.line("#include <stdbool.h>");
        self.line("#include <stddef.h>");
        self.line("#include <stdint.h>");
        self.line("#include <string.h>");
        self.line("#include \"cgen_runtime.h\"");
        if imports.iter().any(|i| i == "math") {
            self.line("#include <math.h>");
        }
        for header in registry.required_headers() {
            writeln!(self.out, "#include \"{header}\"").expect("writing to a String never fails");
        }
    }

    /// Per spec.md §4.4's declaration-macro table: `declare_vec(vec_int32,
    /// int32)`, `declare_hmap(hmap_<K>_<V>, K, V)`, `declare_hset(hset_<T>,
    /// T)` — the macro's element arguments are the mangled element names,
    /// not the raw C type spellings.
    fn write_container_declarations(&mut self, registry: &ContainerRegistry) {
        use crate::analyzer::ctype::CType;
        use crate::registry::{mangle_container, mangle_element};

        for entry in registry.required_declarations() {
            let name = mangle_container(&entry.c_type);
            match &entry.c_type {
                CType::List(elem) => {
                    writeln!(self.out, "declare_vec({name}, {})", mangle_element(elem)).unwrap();
                }
                CType::Set(elem) => {
                    writeln!(self.out, "declare_hset({name}, {})", mangle_element(elem)).unwrap();
                }
                CType::Dict(key, value) => {
                    writeln!(
                        self.out,
                        "declare_hmap({name}, {}, {})",
                        mangle_element(key),
                        mangle_element(value)
                    )
                    .unwrap();
                }
                _ => unreachable!("registry only holds container entries"),
            }
        }
    }

    fn write_records(&mut self, module: &IrModule) {
        for record in &module.records {
            self.line(&format!("typedef struct {} {{", record.name));
            self.indent.push();
            for (name, c_type) in &record.fields {
                self.line(&format!("{} {};", types::c_type_name(c_type), name));
            }
            self.indent.pop();
            self.line(&format!("}} {};", record.name));
            self.out.push('\n');
            self.write_record_constructor(record);
        }
    }

    /// Every record gets a generated `{Name}_new` constructor that takes one
    /// argument per field in declaration order and returns an initialized
    /// value — the source language has no record-literal syntax of its own,
    /// so this is the only way a record ever gets built in the emitted C.
    fn write_record_constructor(&mut self, record: &crate::ir::IrRecord) {
        let params = record
            .fields
            .iter()
            .map(|(name, c_type)| format!("{} {name}", types::c_type_name(c_type)))
            .collect::<Vec<_>>()
            .join(", ");
        let params = if params.is_empty() { "void".to_owned() } else { params };
        self.line(&format!("{} {}_new({params}) {{", record.name, record.name));
        self.indent.push();
        self.line(&format!("{} value;", record.name));
        for (name, _) in &record.fields {
            self.line(&format!("value.{name} = {name};"));
        }
        self.line("return value;");
        self.indent.pop();
        self.line("}");
        self.out.push('\n');
    }

    fn write_functions(&mut self, module: &IrModule, registry: &ContainerRegistry) {
        for function in &module.functions {
            let params = function
                .params
                .iter()
                .map(|(name, c_type)| format!("{} {}", types::c_type_name(c_type), name))
                .collect::<Vec<_>>()
                .join(", ");
            let params = if params.is_empty() { "void".to_owned() } else { params };
            self.line(&format!(
                "{} {}({params}) {{",
                types::c_type_name(&function.return_type),
                function.name
            ));
            self.indent.push();
            for stmt in &function.body {
                stmt::write_stmt(self, stmt, registry);
            }
            self.indent.pop();
            self.line("}");
            self.out.push('\n');
        }
    }

    pub(crate) fn push_line(&mut self, text: &str) {
        self.line(text);
    }

    pub(crate) fn indent_in(&mut self) {
        self.indent.push();
    }

    pub(crate) fn indent_out(&mut self) {
        self.indent.pop();
    }

    pub(crate) fn raw(&mut self) -> &mut String {
        &mut self.out
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
