//! Maps a resolved [`CType`] to the C11 spelling the emitter writes.

use crate::analyzer::ctype::CType;
use crate::registry::mangle_container;

pub fn c_type_name(c_type: &CType) -> String {
    match c_type {
        CType::Int => "int64_t".to_owned(),
        CType::Float => "double".to_owned(),
        CType::Bool => "bool".to_owned(),
        CType::Str => "const char*".to_owned(),
        CType::None => "void".to_owned(),
        CType::Record(name) => name.clone(),
        CType::List(_) | CType::Dict(_, _) | CType::Set(_) => mangle_container(c_type),
    }
}
