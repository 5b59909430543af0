//! AST → linear IR generation for MiniC.
//!
//! [`generate`] walks a syntax tree depth-first and produces a
//! [`Module`]: one ordered instruction list per function, bounded by
//! `entry`/`exit`, with short-circuit `&&`/`||`, structured control flow
//! lowered to labels and branches, and every `return` funnelled through a
//! single exit label.
//!
//! Semantic errors are reported to the [`DiagnosticQueue`] and surface as
//! `Err(ErrorGuaranteed)`; generation stops at the first one.

mod lower;
#[cfg(test)]
mod test_helpers;

use minic_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use minic_ir::ast::{Ast, NodeId};
use minic_ir::Module;

pub use lower::{IrGenerator, Lowered};

/// Generator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenOptions {
    /// Treat node kinds that have no standalone lowering as errors instead
    /// of warnings.
    pub strict_unsupported: bool,
    /// Run the IR verifier on every generated function.
    pub verify: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            strict_unsupported: false,
            verify: true,
        }
    }
}

/// Generate IR for the tree rooted at `root` (normally a `CompileUnit`).
pub fn generate(
    ast: &Ast,
    root: NodeId,
    options: &GenOptions,
    queue: &mut DiagnosticQueue,
) -> Result<Module, ErrorGuaranteed> {
    let mut generator = IrGenerator::new(ast, options.clone(), queue);
    generator.run(root)?;
    Ok(generator.into_module())
}
