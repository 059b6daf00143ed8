//! Binder for jsondl modules.
//!
//! [`bind_module`] walks a parsed module once and produces a
//! [`Module`](jsondl_eval::Module) ready for testing:
//! - one scope per module, `let` block and function
//! - declarations and imports bound, duplicates reported
//! - exports registered, duplicates and empty modules reported
//! - regular expressions compiled
//! - references checked after the walk
//!
//! Semantic errors never abort binding. They are pushed to the sink and the
//! returned module is as complete as the input allows.

mod binder;
mod loader;
mod options;

pub use binder::bind_module;
pub use loader::{MemoryLoader, ModuleLoader};
pub use options::BindOptions;
