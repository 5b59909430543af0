//! The `ir` command: print the generated IR of a MiniC file.

use crate::compile_source;

use super::{read_file, report, CliOptions};

/// Compile `path` and print its IR to stdout. Exits with status 1 on error.
pub fn ir_file(path: &str, options: &CliOptions) {
    let source = read_file(path);
    let mut queue = options.queue();
    let result = compile_source(&source, &options.gen, &mut queue);
    report(path, &mut queue);

    match result {
        Ok(module) => print!("{module}"),
        Err(_) => std::process::exit(1),
    }
}
