//! Lexical scope for the type analyzer. Grounded on
//! `typechecker/typescope.rs::TypeScope` in the teacher, which keeps a
//! stack of frames and resolves a name by walking it from the top down;
//! this drops the teacher's `Rc<RefCell<_>>` sharing since the analyzer
//! here only ever walks one function body at a time, not a shared
//! interpreter environment.

use std::collections::HashMap;

use super::ctype::CType;

pub struct Scope {
    frames: Vec<HashMap<String, CType>>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope { frames: vec![HashMap::new()] }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        assert!(!self.frames.is_empty(), "popped the root scope frame");
    }

    pub fn declare(&mut self, name: &str, ty: CType) {
        self.frames
            .last_mut()
            .expect("scope always has a frame")
            .insert(name.to_owned(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<&CType> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
