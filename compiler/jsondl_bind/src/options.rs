//! Binder configuration.

use std::path::{Path, PathBuf};

/// Options for [`bind_module`](crate::bind_module).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindOptions {
    base_dir: PathBuf,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that relative import specifiers are resolved against.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
