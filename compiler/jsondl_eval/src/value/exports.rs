//! Export tables.

use rustc_hash::FxHashMap;

use crate::native::NativePattern;
use crate::Value;

/// Mapping from export id to value, in registration order.
///
/// Compiled modules expose their exports as [`Value::Declaration`] handles;
/// native libraries register predicates directly.
#[derive(Clone, Debug, Default)]
pub struct Exports {
    entries: Vec<(String, Value)>,
    index: FxHashMap<String, usize>,
}

impl Exports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export table of native predicates, keyed by their names.
    pub fn from_natives(natives: impl IntoIterator<Item = NativePattern>) -> Self {
        let mut exports = Exports::new();
        for native in natives {
            let name = native.name().to_owned();
            exports.insert(name, Value::Native(native.into()));
        }
        exports
    }

    /// Add or replace an export.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            self.entries[slot].1 = value;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
