//! Module loading.
//!
//! The binder resolves every `import` through a [`ModuleLoader`]. Locating
//! and parsing files is the embedder's business; [`MemoryLoader`] serves
//! modules and native export tables registered ahead of time.

use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use jsondl_diagnostic::{DiagnosticSink, ErrorCode};
use jsondl_eval::{Exports, Module};
use jsondl_ir::ImportDecl;
use rustc_hash::FxHashMap;

/// Resolves import declarations to export tables.
pub trait ModuleLoader {
    /// Load the module named by `import`.
    ///
    /// On failure the loader reports exactly one error naming the
    /// specifier and returns `None`.
    fn import_module(
        &self,
        import: &ImportDecl,
        base_dir: &Path,
        diagnostics: &mut DiagnosticSink,
    ) -> Option<Rc<Exports>>;
}

/// Loader backed by an in-memory registry.
///
/// Relative specifiers (`./x`, `../x`) are resolved against the importing
/// module's base directory; other specifiers are looked up as written.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    modules: FxHashMap<PathBuf, Rc<Exports>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an export table under `specifier`.
    pub fn register(&mut self, specifier: impl AsRef<Path>, exports: Rc<Exports>) {
        self.modules.insert(normalize(specifier.as_ref()), exports);
    }

    /// Register a compiled module under `specifier`.
    pub fn register_module(&mut self, specifier: impl AsRef<Path>, module: &Module) {
        self.register(specifier, module.exports());
    }

    pub fn contains(&self, specifier: impl AsRef<Path>) -> bool {
        self.modules.contains_key(&normalize(specifier.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for MemoryLoader {
    fn import_module(
        &self,
        import: &ImportDecl,
        base_dir: &Path,
        diagnostics: &mut DiagnosticSink,
    ) -> Option<Rc<Exports>> {
        let key = resolve(&import.specifier, base_dir);
        if let Some(exports) = self.modules.get(&key) {
            return Some(Rc::clone(exports));
        }
        tracing::debug!(specifier = %import.specifier, resolved = %key.display(), "module not found");
        let _ = diagnostics.error_at(
            ErrorCode::E1006,
            format!("cannot find module '{}'", import.specifier),
            import.span,
        );
        None
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Registry key of `specifier` imported from `base_dir`.
pub(crate) fn resolve(specifier: &str, base_dir: &Path) -> PathBuf {
    if is_relative(specifier) {
        normalize(&base_dir.join(specifier))
    } else {
        normalize(Path::new(specifier))
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}
