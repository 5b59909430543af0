//! Command implementations for the `minicc` binary.

mod check;
mod ir;

pub use check::check_file;
pub use ir::ir_file;

use minic_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use minic_irgen::GenOptions;

/// Options shared by every command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub gen: GenOptions,
    /// Maximum number of errors reported; `None` keeps the queue default.
    pub error_limit: Option<usize>,
}

impl CliOptions {
    /// A diagnostic queue configured from these options.
    pub fn queue(&self) -> DiagnosticQueue {
        let mut config = DiagnosticConfig::default();
        if let Some(limit) = self.error_limit {
            config.error_limit = limit;
        }
        DiagnosticQueue::with_config(config)
    }
}

/// Split command arguments into options and the single input path.
///
/// Recognised flags: `--strict`, `--no-verify`, `--error-limit=<n>`.
pub fn parse_options(args: &[String]) -> Result<(CliOptions, String), String> {
    let mut options = CliOptions::default();
    let mut path = None;

    for arg in args {
        match arg.as_str() {
            "--strict" => options.gen.strict_unsupported = true,
            "--no-verify" => options.gen.verify = false,
            flag if flag.starts_with("--error-limit=") => {
                let value = &flag["--error-limit=".len()..];
                let limit = value
                    .parse()
                    .map_err(|_| format!("invalid error limit `{value}`"))?;
                options.error_limit = Some(limit);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option `{flag}`")),
            file => {
                if path.is_some() {
                    return Err(format!("unexpected argument `{file}`"));
                }
                path = Some(file.to_owned());
            }
        }
    }

    let path = path.ok_or_else(|| "missing file path".to_owned())?;
    Ok((options, path))
}

/// Render flushed diagnostics for `path`, followed by an error summary.
pub fn render_diagnostics(path: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        out.push_str(&format!("{path}: {diag}\n"));
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    match errors {
        0 => {}
        1 => out.push_str("error: aborting due to 1 previous error\n"),
        n => out.push_str(&format!("error: aborting due to {n} previous errors\n")),
    }
    out
}

fn report(path: &str, queue: &mut DiagnosticQueue) {
    let diagnostics = queue.flush();
    if !diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(path, &diagnostics));
    }
}

fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
