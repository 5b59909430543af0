#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use minic_diagnostic::{DiagnosticQueue, ErrorCode};
use minic_ir::ast::{Ast, NodeKind};
use minic_ir::{FuncId, Instr};
use pretty_assertions::assert_eq;

use crate::test_helpers::{code, generate_err, generate_ok, lines, parse};
use crate::{generate, GenOptions, IrGenerator};

#[test]
fn test_if_else_shape() {
    let module =
        generate_ok("int f() { int a; a = 1; if (a) { a = 2; } else { a = 3; } return a; }");
    assert_eq!(
        code(&module, "f"),
        lines(&[
            "entry",
            "%l1 = 1",
            "bc %l1, label .L1, label .L2",
            ".L1:",
            "%l1 = 2",
            "goto label .L3",
            ".L2:",
            "%l1 = 3",
            "goto label .L3",
            ".L3:",
            "%l0 = %l1",
            "goto label .L0",
            ".L0:",
            "exit %l0",
        ])
    );
    let func = &module.functions()[0];
    assert_eq!(func.local(func.return_slot().unwrap().as_local().unwrap()).name, None);
    assert_eq!(func.locals()[1].name.as_deref(), Some("a"));
}

#[test]
fn test_if_without_else() {
    let module = generate_ok("void f(int a) { if (a) ; }");
    assert_eq!(
        code(&module, "f"),
        lines(&[
            "entry",
            "bc %l0, label .L1, label .L2",
            ".L1:",
            ".L2:",
            "goto label .L0",
            ".L0:",
            "exit",
        ])
    );
}

#[test]
fn test_while_with_break_and_continue() {
    let module = generate_ok(
        "void f() { int i; i = 0; while (i < 10) { if (i == 5) break; i = i + 1; continue; } }",
    );
    assert_eq!(
        code(&module, "f"),
        lines(&[
            "entry",
            "%l0 = 0",
            "goto label .L1",
            ".L1:",
            "%t4 = icmp_lt %l0, 10",
            "bc %t4, label .L2, label .L3",
            ".L2:",
            "%t7 = icmp_eq %l0, 5",
            "bc %t7, label .L4, label .L5",
            ".L4:",
            "goto label .L3",
            ".L5:",
            "%t12 = add %l0, 1",
            "%l0 = %t12",
            "goto label .L1",
            "goto label .L1",
            ".L3:",
            "goto label .L0",
            ".L0:",
            "exit",
        ])
    );
}

#[test]
fn test_nested_loops_target_innermost() {
    let module = generate_ok("void f(int a) { while (a) { while (a) break; continue; } }");
    let text = code(&module, "f");
    // Outer: cond .L1, end .L3. Inner: cond .L4, end .L6.
    let inner_end = text.iter().position(|l| l == ".L6:").unwrap();
    assert_eq!(text[inner_end - 2], "goto label .L6");
    assert_eq!(text[inner_end + 1], "goto label .L1");
}

#[test]
fn test_loop_depth_restored() {
    let (ast, root) = parse("void f(int a) { while (a) { while (a) { } } }");
    let mut queue = DiagnosticQueue::new();
    let mut generator = IrGenerator::new(&ast, GenOptions::default(), &mut queue);
    generator.run(root).unwrap();
    assert_eq!(generator.loop_depth(), 0);
    assert_eq!(generator.module().scope_depth(), 1);
}

#[test]
fn test_break_outside_loop_emits_nothing() {
    let (ast, root) = parse("void f() { { break; } }");
    let mut queue = DiagnosticQueue::new();
    let mut generator = IrGenerator::new(&ast, GenOptions::default(), &mut queue);
    assert!(generator.run(root).is_err());

    let func = generator.module().function(FuncId::new(0));
    assert_eq!(func.instrs().filter(|i| i.is_goto()).count(), 0);
    assert_eq!(generator.module().scope_depth(), 1);
    drop(generator);
    assert_eq!(queue.codes(), vec![ErrorCode::E2007]);
}

#[test]
fn test_continue_outside_loop() {
    assert_eq!(generate_err("void f() { continue; }"), vec![ErrorCode::E2008]);
}

#[test]
fn test_break_after_loop_fails() {
    // The loop stack is popped once the loop is done.
    assert_eq!(
        generate_err("void f(int a) { while (a) { } break; }"),
        vec![ErrorCode::E2007]
    );
}

#[test]
fn test_multiple_returns_share_exit() {
    let module = generate_ok("int f() { return 1; return 2; }");
    assert_eq!(
        code(&module, "f"),
        lines(&[
            "entry",
            "%l0 = 1",
            "goto label .L0",
            "%l0 = 2",
            "goto label .L0",
            ".L0:",
            "exit %l0",
        ])
    );
    let func = &module.functions()[0];
    let exits = func
        .instrs()
        .filter(|i| matches!(i, Instr::Label(_)))
        .count();
    assert_eq!(exits, 1);
}

#[test]
fn test_bare_return() {
    let module = generate_ok("void f() { return; }");
    assert_eq!(
        code(&module, "f"),
        lines(&["entry", "goto label .L0", ".L0:", "exit"])
    );
}

#[test]
fn test_return_value_from_void_function() {
    assert_eq!(generate_err("void f() { return 1; }"), vec![ErrorCode::E2011]);
}

#[test]
fn test_return_outside_function() {
    let mut ast = Ast::new();
    let ret = ast.push(NodeKind::Return, std::iter::empty(), 2);
    let root = ast.push(NodeKind::CompileUnit, [ret], 1);
    let mut queue = DiagnosticQueue::new();
    assert!(generate(&ast, root, &GenOptions::default(), &mut queue).is_err());
    assert_eq!(queue.codes(), vec![ErrorCode::E2011]);
}

#[test]
fn test_block_scopes_allow_shadowing() {
    let module = generate_ok("int f() { int a; a = 1; { int a; a = 2; } return a; }");
    assert_eq!(
        code(&module, "f"),
        lines(&[
            "entry",
            "%l1 = 1",
            "%l2 = 2",
            "%l0 = %l1",
            "goto label .L0",
            ".L0:",
            "exit %l0",
        ])
    );
}

#[test]
fn test_block_names_do_not_leak() {
    assert_eq!(
        generate_err("void f() { { int b; } b = 1; }"),
        vec![ErrorCode::E2004]
    );
}

#[test]
fn test_duplicate_in_same_block() {
    assert_eq!(
        generate_err("void f() { int a; int a; }"),
        vec![ErrorCode::E2003]
    );
    // The function frame holds parameters and the body's top-level names.
    assert_eq!(
        generate_err("void f(int a) { int a; }"),
        vec![ErrorCode::E2003]
    );
}

#[test]
fn test_deeply_nested_blocks() {
    const DEPTH: usize = 10_000;
    let source = format!(
        "void f() {{ {} return; {} }}",
        "{ int x; ".repeat(DEPTH),
        "}".repeat(DEPTH)
    );
    let module = generate_ok(&source);
    assert_eq!(
        code(&module, "f"),
        lines(&["entry", "goto label .L0", ".L0:", "exit"])
    );
    assert_eq!(module.functions()[0].locals().len(), DEPTH);
}

#[test]
fn test_return_of_void_call_has_no_value() {
    assert_eq!(
        generate_err("void g() { } int f() { return g(); }"),
        vec![ErrorCode::E2009]
    );
}
