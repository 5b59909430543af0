#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use minic_diagnostic::{DiagnosticQueue, ErrorCode};
use minic_ir::ast::{Ast, NodeId, NodeKind};
use minic_ir::Type;
use pretty_assertions::assert_eq;

use crate::parse;

/// Render a subtree as an s-expression.
fn sexp(ast: &Ast, id: NodeId) -> String {
    let head = match ast.kind(id) {
        NodeKind::IntLiteral(n) => return n.to_string(),
        NodeKind::Ident(name) => return name.clone(),
        NodeKind::Type(ty) => return ty.keyword().to_owned(),
        NodeKind::Block { needs_scope: true } => "block".to_owned(),
        NodeKind::Block { needs_scope: false } => "block-noscope".to_owned(),
        other => format!("{other:?}"),
    };
    let children: Vec<String> = ast.children(id).iter().map(|&c| sexp(ast, c)).collect();
    if children.is_empty() {
        format!("({head})")
    } else {
        format!("({head} {})", children.join(" "))
    }
}

fn parse_ok(source: &str) -> String {
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse(source, &mut queue).unwrap();
    sexp(&ast, root)
}

/// Parse `expr` as the body of `return expr;` and render it.
fn expr(expr: &str) -> String {
    let source = format!("int f() {{ return {expr}; }}");
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse(&source, &mut queue).unwrap();
    let func = ast.children(root)[0];
    let body = ast.children(func)[3];
    let ret = ast.children(body)[0];
    sexp(&ast, ast.children(ret)[0])
}

fn parse_err(source: &str) -> Vec<ErrorCode> {
    let mut queue = DiagnosticQueue::new();
    assert!(parse(source, &mut queue).is_err());
    queue.codes()
}

#[test]
fn test_function_definition() {
    assert_eq!(
        parse_ok("int add(int a, int b) { return a + b; }"),
        "(CompileUnit (FuncDef int add (FormalParams (FormalParam int a) (FormalParam int b)) \
         (block (Return (Add a b)))))"
    );
}

#[test]
fn test_globals_and_multi_declarations() {
    assert_eq!(
        parse_ok("int g, h; void main() { int a; }"),
        "(CompileUnit (DeclStmt (VarDecl int g) (VarDecl int h)) \
         (FuncDef void main (FormalParams) (block (DeclStmt (VarDecl int a)))))"
    );
}

#[test]
fn test_precedence() {
    assert_eq!(expr("1 + 2 * 3"), "(Add 1 (Mul 2 3))");
    assert_eq!(expr("1 - 2 - 3"), "(Sub (Sub 1 2) 3)");
    assert_eq!(
        expr("a || b && c == d < e + f * -g"),
        "(Or a (And b (Eq c (Lt d (Add e (Mul f (Neg g)))))))"
    );
    assert_eq!(expr("!a != b"), "(Ne (Not a) b)");
    assert_eq!(expr("(a || b) && c"), "(And (Or a b) c)");
    assert_eq!(expr("a % b / c"), "(Div (Mod a b) c)");
    assert_eq!(expr("a >= b > c <= d"), "(Le (Gt (Ge a b) c) d)");
}

#[test]
fn test_assignment_is_right_associative_expression() {
    assert_eq!(expr("a = b = 1"), "(Assign a (Assign b 1))");
    assert_eq!(expr("r = (a) && (b = 5)"), "(Assign r (And a (Assign b 5)))");
}

#[test]
fn test_literal_bases() {
    assert_eq!(expr("0x10 + 010 + 10"), "(Add (Add 16 8) 10)");
}

#[test]
fn test_calls() {
    assert_eq!(expr("f()"), "(FuncCall f (RealParams))");
    assert_eq!(
        expr("g(1, h(x), y + 1)"),
        "(FuncCall g (RealParams 1 (FuncCall h (RealParams x)) (Add y 1)))"
    );
}

#[test]
fn test_control_flow() {
    assert_eq!(
        parse_ok("void f() { while (1) { if (a) break; else continue; } if (b) ; return; }"),
        "(CompileUnit (FuncDef void f (FormalParams) (block \
         (While 1 (block (IfElse a (Break) (Continue)))) \
         (If b (block-noscope)) \
         (Return))))"
    );
}

#[test]
fn test_empty_statements_are_dropped() {
    assert_eq!(
        parse_ok("void f() { ; ; }"),
        "(CompileUnit (FuncDef void f (FormalParams) (block)))"
    );
}

#[test]
fn test_lines() {
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse("int f()\n{\n  return\n    1;\n}", &mut queue).unwrap();
    let func = ast.children(root)[0];
    let body = ast.children(func)[3];
    let ret = ast.children(body)[0];
    assert_eq!(ast.line(func), 1);
    assert_eq!(ast.line(body), 2);
    assert_eq!(ast.line(ret), 3);
    assert_eq!(ast.line(ast.children(ret)[0]), 4);
}

#[test]
fn test_void_declaration_parses() {
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse("void v;", &mut queue).unwrap();
    let decl = ast.children(ast.children(root)[0])[0];
    assert_eq!(
        ast.kind(ast.children(decl)[0]).as_type(),
        Some(Type::Void)
    );
}

#[test]
fn test_syntax_errors() {
    assert_eq!(parse_err("int f() { return 1 }"), vec![ErrorCode::E1001]);
    assert_eq!(parse_err("int f() { return +; }"), vec![ErrorCode::E1002]);
    assert_eq!(parse_err("int 3;"), vec![ErrorCode::E1003]);
    assert_eq!(parse_err("int f() { 1 = 2; }"), vec![ErrorCode::E1004]);
    assert_eq!(parse_err("int f() { f() = 2; }"), vec![ErrorCode::E1004]);
    assert_eq!(parse_err("return 1;"), vec![ErrorCode::E1001]);
    assert_eq!(parse_err("int f() {"), vec![ErrorCode::E1001]);
}

#[test]
fn test_lexer_errors_stop_parsing() {
    assert_eq!(parse_err("int f() { return 1 @ 2; }"), vec![ErrorCode::E0001]);
}

const DEEP: usize = 100_000;

#[test]
fn test_deeply_nested_parentheses() {
    let source = format!("int f() {{ return {}1{}; }}", "(".repeat(DEEP), ")".repeat(DEEP));
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse(&source, &mut queue).unwrap();
    let func = ast.children(root)[0];
    let ret = ast.children(ast.children(func)[3])[0];
    assert_eq!(ast.kind(ast.children(ret)[0]), &NodeKind::IntLiteral(1));
}

#[test]
fn test_deeply_nested_unary_and_blocks() {
    let source = format!(
        "int f() {{ {} return {}1; {} }}",
        "{".repeat(DEEP),
        "- ".repeat(DEEP),
        "}".repeat(DEEP)
    );
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = parse(&source, &mut queue).unwrap();

    let mut negations = 0;
    let mut node = root;
    while let Some(&child) = ast.children(node).last() {
        if matches!(ast.kind(node), NodeKind::Neg) {
            negations += 1;
        }
        node = child;
    }
    assert_eq!(negations, DEEP);
    assert_eq!(ast.kind(node), &NodeKind::IntLiteral(1));
}
