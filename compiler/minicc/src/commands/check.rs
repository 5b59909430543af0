//! The `check` command: report diagnostics without printing IR.

use tracing::info;

use crate::compile_source;

use super::{read_file, report, CliOptions};

/// Compile `path` and report its diagnostics. Exits with status 1 on error.
pub fn check_file(path: &str, options: &CliOptions) {
    let source = read_file(path);
    let mut queue = options.queue();
    let result = compile_source(&source, &options.gen, &mut queue);
    report(path, &mut queue);

    match result {
        Ok(module) => info!(path, functions = module.functions().len(), "check passed"),
        Err(_) => std::process::exit(1),
    }
}
