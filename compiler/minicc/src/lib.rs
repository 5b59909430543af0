//! MiniC compiler driver.
//!
//! Ties the front end ([`minic_parse`]) to the IR generator
//! ([`minic_irgen`]) and hosts the command implementations used by the
//! `minicc` binary.

pub mod commands;

use std::sync::Once;

use minic_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use minic_ir::Module;
use minic_irgen::GenOptions;
use tracing::debug;

/// Parse and lower `source`, reporting problems to `queue`.
pub fn compile_source(
    source: &str,
    options: &GenOptions,
    queue: &mut DiagnosticQueue,
) -> Result<Module, ErrorGuaranteed> {
    let (ast, root) = minic_parse::parse(source, queue)?;
    debug!(nodes = ast.len(), "parsed");
    let module = minic_irgen::generate(&ast, root, options, queue)?;
    debug!(
        functions = module.functions().len(),
        globals = module.globals().len(),
        "generated"
    );
    Ok(module)
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enabled by `RUST_LOG` (for example
/// `RUST_LOG=minic_irgen=trace`); setting `MINIC_LOG_TREE` switches to an
/// indented tree of spans and events and defaults the filter to `debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let tree = std::env::var_os("MINIC_LOG_TREE").is_some();
        if std::env::var_os("RUST_LOG").is_none() && !tree {
            return;
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        if tree {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
