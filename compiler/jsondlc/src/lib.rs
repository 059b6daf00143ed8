//! jsondl: validate JSON values against declarative patterns.
//!
//! This crate ties the pipeline together:
//! - [`jsondl_ir`]: the syntax tree a parser produces
//! - [`jsondl_bind`]: scope resolution and module loading
//! - [`jsondl_eval`]: the pattern engine and [`Module::test`]
//! - [`jsondl_diagnostic`]: messages collected along the way
//!
//! ```text
//! let builtins = Rc::new(Builtins::new(my_natives())?);
//! let module = compile(parsed, &MemoryLoader::new(), &builtins, &BindOptions::new(), &mut sink)?;
//! let ok = module.test(&json!({"name": "ann"}), &mut sink)?;
//! ```

use std::rc::Rc;
use std::sync::Once;

pub use jsondl_bind::{bind_module, BindOptions, MemoryLoader, ModuleLoader};
pub use jsondl_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode, ErrorGuaranteed, Severity};
pub use jsondl_eval::{
    json_equal, Builtins, BuiltinsError, EvalError, EvalResult, ExecutionContext, Exports, Module,
    NativePattern, PathSegment, TestError, TransactionalSet, Value,
};
pub use jsondl_ir::{Cardinality, DeclId, ExprId, JsonValue, ModuleBuilder, ParsedModule};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Bind `parsed`, rejecting the module if binding reported any error.
///
/// Diagnostics of the binding run are appended to `diagnostics` either way.
pub fn compile(
    parsed: ParsedModule,
    loader: &dyn ModuleLoader,
    builtins: &Rc<Builtins>,
    options: &BindOptions,
    diagnostics: &mut DiagnosticSink,
) -> Result<Module, ErrorGuaranteed> {
    let mut local = DiagnosticSink::new();
    let module = bind_module(parsed, loader, builtins, options, &mut local);
    let errors = local.error_count();
    diagnostics.merge(local);
    match ErrorGuaranteed::from_error_count(errors) {
        Some(guarantee) => {
            tracing::debug!(errors, "module rejected");
            Err(guarantee)
        }
        None => Ok(module),
    }
}
