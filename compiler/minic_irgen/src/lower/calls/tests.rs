use minic_diagnostic::{DiagnosticQueue, ErrorCode};
use pretty_assertions::assert_eq;

use crate::test_helpers::{code, generate_err, generate_ok, lines, parse};
use crate::{generate, GenOptions};

#[test]
fn test_nested_calls_evaluate_arguments_in_order() {
    let module = generate_ok(
        "int add(int a, int b) { return a + b; } int main() { return add(1, add(2, 3)); }",
    );
    assert_eq!(
        code(&module, "main"),
        lines(&[
            "entry",
            "%t1 = call i32 @add(i32 2, i32 3)",
            "%t2 = call i32 @add(i32 1, i32 %t1)",
            "%l0 = %t2",
            "goto label .L1",
            ".L1:",
            "exit %l0",
        ])
    );

    let main = &module.functions()[1];
    assert!(main.has_call());
    assert_eq!(main.max_call_args(), 2);
    let add = &module.functions()[0];
    assert!(!add.has_call());
    assert_eq!(add.max_call_args(), 0);
}

#[test]
fn test_void_call_statement() {
    let module = generate_ok("void g() { } void f() { g(); }");
    assert_eq!(
        code(&module, "f"),
        lines(&["entry", "call void @g()", "goto label .L1", ".L1:", "exit"])
    );
}

#[test]
fn test_recursive_call() {
    let module = generate_ok("int f(int n) { return f(n - 1); }");
    assert_eq!(code(&module, "f")[2], "%t2 = call i32 @f(i32 %t1)");
}

#[test]
fn test_argument_count_mismatch() {
    assert_eq!(
        generate_err("int g() { return 1; } int f() { return g(1); }"),
        vec![ErrorCode::E2006]
    );
    assert_eq!(
        generate_err("int g(int a, int b) { return a; } int f() { return g(1); }"),
        vec![ErrorCode::E2006]
    );
}

fn arity_message(source: &str) -> String {
    let (ast, root) = parse(source);
    let mut queue = DiagnosticQueue::new();
    assert!(generate(&ast, root, &GenOptions::default(), &mut queue).is_err());
    queue.flush().remove(0).message
}

#[test]
fn test_arity_message() {
    assert_eq!(
        arity_message("int g() { return 1; } int f() { return g(1); }"),
        "`g` takes 0 arguments but 1 was supplied"
    );
    assert_eq!(
        arity_message("int g(int a) { return a; } int f() { return g(1, 2); }"),
        "`g` takes 1 argument but 2 were supplied"
    );
    assert_eq!(
        arity_message("int g(int a, int b) { return a; } int f() { return g(); }"),
        "`g` takes 2 arguments but 0 were supplied"
    );
}

#[test]
fn test_call_before_definition() {
    assert_eq!(
        generate_err("int f() { return g(); } int g() { return 1; }"),
        vec![ErrorCode::E2005]
    );
}

#[test]
fn test_argument_errors_come_before_arity() {
    assert_eq!(
        generate_err("int g() { return 1; } int f() { return g(x); }"),
        vec![ErrorCode::E2004]
    );
}
