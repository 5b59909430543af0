//! Diagnostics for the MiniC compiler.
//!
//! Every phase reports problems the same way: build a [`Diagnostic`] with an
//! [`ErrorCode`], push it into the [`DiagnosticQueue`], and propagate the
//! returned [`ErrorGuaranteed`].
//!
//! ```text
//! let guar = queue.emit(Diagnostic::error(ErrorCode::E2004)
//!     .with_message("undefined variable `b`")
//!     .at_line(3));
//! return Err(guar);
//! ```
//!
//! The queue is the single logging sink: each accepted diagnostic is also
//! mirrored to `tracing` at the matching level.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{
    malformed_ast, undefined_function, undefined_variable, unexpected_token, Diagnostic, Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
