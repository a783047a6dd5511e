//! Phase D: the container registry (spec.md §4.5). Tracks exactly which
//! container instantiations the emitted translation unit needs, and
//! whether each was ever *actually* used (a local with an initializer, a
//! parameter, or a return type) versus only ever named as a record field's
//! declared type ("speculative" — spec.md §8 Scenario 3). A speculative
//! entry still needs the record's field to type-check, but never forces a
//! `#include` or a generated container declaration on its own.
//!
//! Registration is upgrade-only: once a container is marked `Actual` it
//! never moves back to `Speculative`, matching the minimality invariant
//! (spec.md §3 invariant 2) that only what the translated program truly
//! exercises gets emitted. A fresh registry is built per translation run —
//! `reset` exists so the driver can reuse one `ContainerRegistry` value
//! across files without carrying state from a prior run into the next
//! (spec.md §9: no cross-run state).

use std::collections::HashMap;

use crate::analyzer::ctype::CType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Actual,
    Speculative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub c_type: CType,
    pub provenance: Provenance,
}

#[derive(Debug, Default)]
pub struct ContainerRegistry {
    entries: Vec<Entry>,
    index: HashMap<CType, usize>,
}

impl ContainerRegistry {
    pub fn new() -> ContainerRegistry {
        ContainerRegistry::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Registers `c_type` if it's a container; no-op for scalars and
    /// records, which need no generated declaration of their own here.
    pub fn register(&mut self, c_type: &CType, provenance: Provenance) {
        if !c_type.is_container() {
            return;
        }
        match self.index.get(c_type) {
            Some(&i) => {
                if provenance == Provenance::Actual {
                    self.entries[i].provenance = Provenance::Actual;
                }
            }
            None => {
                self.index.insert(c_type.clone(), self.entries.len());
                self.entries.push(Entry { c_type: c_type.clone(), provenance });
            }
        }
    }

    /// Every entry that actually needs a generated container declaration —
    /// speculative-only entries are filtered out, per the minimality
    /// invariant. Ordered so that, were containers ever allowed to nest, a
    /// dependency's declaration would precede its dependent's; today that
    /// only matters for determinism, since §9 forbids nested containers.
    pub fn required_declarations(&self) -> Vec<&Entry> {
        let mut actual: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.provenance == Provenance::Actual)
            .collect();
        actual.sort_by(|a, b| mangle_container(&a.c_type).cmp(&mangle_container(&b.c_type)));
        actual
    }

    /// The distinct container-library headers the actually-used entries
    /// need, in a stable order.
    pub fn required_headers(&self) -> Vec<&'static str> {
        let mut headers: Vec<&'static str> = self
            .required_declarations()
            .into_iter()
            .map(|e| header_for(&e.c_type))
            .collect();
        headers.sort_unstable();
        headers.dedup();
        headers
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn header_for(c_type: &CType) -> &'static str {
    match c_type {
        CType::List(_) => "clist.h",
        CType::Dict(_, _) => "cdict.h",
        CType::Set(_) => "cset.h",
        _ => unreachable!("header_for called on a non-container type"),
    }
}

/// The fixed scalar element manglings from spec.md §4.4's type table.
/// Records mangle to their declared name verbatim (nested containers are
/// rejected before this point, so the container arms never fire here).
pub fn mangle_element(c_type: &CType) -> String {
    match c_type {
        CType::Int => "int32".to_owned(),
        CType::Float => "float64".to_owned(),
        CType::Bool => "bool8".to_owned(),
        CType::Str => "cstr".to_owned(),
        CType::None => "void".to_owned(),
        CType::Record(name) => name.clone(),
        CType::List(_) | CType::Set(_) | CType::Dict(_, _) => {
            unreachable!("nested containers are rejected before this point")
        }
    }
}

/// Deterministic C type-name mangling per spec.md §4.4's table:
/// `list<int>` -> `vec_int32`, `dict<str, int>` -> `hmap_cstr_int32`,
/// `set<int>` -> `hset_int32`.
pub fn mangle_container(c_type: &CType) -> String {
    match c_type {
        CType::List(elem) => format!("vec_{}", mangle_element(elem)),
        CType::Set(elem) => format!("hset_{}", mangle_element(elem)),
        CType::Dict(key, value) => format!("hmap_{}_{}", mangle_element(key), mangle_element(value)),
        _ => unreachable!("mangle_container called on a non-container type"),
    }
}

/// `{var}_{op}` derived identifier, used for comprehension-desugaring
/// temporaries and loop cursors so two independent comprehensions over the
/// same source variable never collide.
pub fn derived_name(var: &str, op: &str) -> String {
    format!("{var}_{op}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_only_provenance() {
        let mut registry = ContainerRegistry::new();
        let list_int = CType::List(Box::new(CType::Int));
        registry.register(&list_int, Provenance::Speculative);
        registry.register(&list_int, Provenance::Actual);
        registry.register(&list_int, Provenance::Speculative);
        assert_eq!(registry.required_declarations().len(), 1);
        assert_eq!(registry.required_declarations()[0].provenance, Provenance::Actual);
    }

    #[test]
    fn speculative_only_is_excluded() {
        let mut registry = ContainerRegistry::new();
        let set_str = CType::Set(Box::new(CType::Str));
        registry.register(&set_str, Provenance::Speculative);
        assert!(registry.required_declarations().is_empty());
    }

    #[test]
    fn mangles_nested_dict() {
        let dict = CType::Dict(Box::new(CType::Str), Box::new(CType::Int));
        assert_eq!(mangle_container(&dict), "hmap_cstr_int32");
    }

    #[test]
    fn mangles_list_of_int() {
        let list = CType::List(Box::new(CType::Int));
        assert_eq!(mangle_container(&list), "vec_int32");
    }

    #[test]
    fn derives_per_variable_name() {
        assert_eq!(derived_name("numbers", "push"), "numbers_push");
    }
}
