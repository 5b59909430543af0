//! Front end for MiniC: source text to [`Ast`].
//!
//! ```text
//! let mut queue = DiagnosticQueue::new();
//! let (ast, root) = minic_parse::parse("int main() { return 0; }", &mut queue)?;
//! ```

pub mod lexer;
mod parser;

use minic_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use minic_ir::ast::{Ast, NodeId};
use tracing::debug;

pub use lexer::{lex, Token, TokenKind};

/// Parse a whole compile unit.
///
/// Returns the tree and its `CompileUnit` root. Lexical errors are all
/// reported before failing; parsing stops at the first syntax error.
pub fn parse(source: &str, queue: &mut DiagnosticQueue) -> Result<(Ast, NodeId), ErrorGuaranteed> {
    let tokens = lex(source, queue)?;
    debug!(tokens = tokens.len(), "lexed");
    let mut parser = parser::Parser::new(tokens, queue);
    let root = parser.compile_unit()?;
    let ast = parser.into_ast();
    debug!(nodes = ast.len(), "parsed");
    Ok((ast, root))
}
