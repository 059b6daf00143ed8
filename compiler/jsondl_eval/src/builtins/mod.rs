//! The builtin root scope.
//!
//! Built once by the embedder and shared by every module bound with it.
//! Lookups that fall off the outermost module scope end here.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{BuiltinsError, NativePattern};

/// Immutable table of builtin native predicates.
#[derive(Debug, Default)]
pub struct Builtins {
    natives: FxHashMap<String, Rc<NativePattern>>,
}

impl Builtins {
    /// Build the table, rejecting duplicate names.
    pub fn new(natives: impl IntoIterator<Item = NativePattern>) -> Result<Self, BuiltinsError> {
        let mut table = FxHashMap::default();
        for native in natives {
            let name = native.name().to_owned();
            if table.contains_key(&name) {
                return Err(BuiltinsError::Duplicate(name));
            }
            table.insert(name, Rc::new(native));
        }
        Ok(Builtins { natives: table })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Rc<NativePattern>> {
        self.natives.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.natives.contains_key(name)
    }

    /// Builtin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.natives.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.natives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty()
    }
}
