//! Shared test utilities for lowering tests. Only compiled in test builds.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use minic_diagnostic::{DiagnosticQueue, ErrorCode};
use minic_ir::ast::{Ast, NodeId};
use minic_ir::Module;

use crate::{generate, GenOptions};

/// Parse `source`, panicking on front-end errors.
pub(crate) fn parse(source: &str) -> (Ast, NodeId) {
    let mut queue = DiagnosticQueue::new();
    minic_parse::parse(source, &mut queue).unwrap()
}

pub(crate) fn generate_ok(source: &str) -> Module {
    let (ast, root) = parse(source);
    let mut queue = DiagnosticQueue::new();
    let module = generate(&ast, root, &GenOptions::default(), &mut queue).unwrap();
    assert_eq!(queue.error_count(), 0);
    module
}

pub(crate) fn generate_err(source: &str) -> Vec<ErrorCode> {
    let (ast, root) = parse(source);
    let mut queue = DiagnosticQueue::new();
    assert!(generate(&ast, root, &GenOptions::default(), &mut queue).is_err());
    queue.codes()
}

/// Emitted instructions of the function called `name`, as text.
pub(crate) fn code(module: &Module, name: &str) -> Vec<String> {
    let id = module.find_function(name).unwrap();
    module.code_lines(id)
}

pub(crate) fn lines(expected: &[&str]) -> Vec<String> {
    expected.iter().map(|s| (*s).to_owned()).collect()
}
