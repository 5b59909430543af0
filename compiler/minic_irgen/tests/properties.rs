//! Property-based tests for IR generation.
//!
//! Random well-scoped MiniC functions are generated and lowered; every
//! result must pass the IR verifier, and generator state (loop stack, scope
//! frames, active function) must be back at rest afterwards, whether
//! generation succeeded or failed.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::uninlined_format_args,
    clippy::needless_pass_by_value,
    reason = "Proptest macros generate code with these patterns"
)]

use minic_diagnostic::{DiagnosticQueue, ErrorCode};
use minic_ir::verify::verify_module;
use minic_ir::Instr;
use minic_irgen::{GenOptions, IrGenerator};
use proptest::prelude::*;

// -- Source generation --

fn var_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("a"), Just("b"), Just("c")]
}

fn expr_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0u32..100).prop_map(|n| n.to_string()),
        var_strategy().prop_map(str::to_owned),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        let op = prop_oneof![
            Just("+"),
            Just("-"),
            Just("*"),
            Just("/"),
            Just("%"),
            Just("=="),
            Just("!="),
            Just("<"),
            Just(">="),
            Just("&&"),
            Just("||"),
        ];
        prop_oneof![
            (inner.clone(), op, inner.clone()).prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            inner.clone().prop_map(|e| format!("!{e}")),
            inner.clone().prop_map(|e| format!("-{e}")),
            (var_strategy(), inner).prop_map(|(v, e)| format!("({v} = {e})")),
        ]
    })
}

fn stmt_strategy(depth: u32, in_loop: bool) -> BoxedStrategy<String> {
    let assign = (var_strategy(), expr_strategy())
        .prop_map(|(v, e)| format!("{v} = {e};"))
        .boxed();
    let leaf = if in_loop {
        prop_oneof![
            4 => assign,
            1 => Just("break;".to_owned()),
            1 => Just("continue;".to_owned()),
        ]
        .boxed()
    } else {
        assign
    };
    if depth == 0 {
        return leaf;
    }

    let block = prop::collection::vec(stmt_strategy(depth - 1, in_loop), 0..3)
        .prop_map(|stmts| format!("{{ int d; {} }}", stmts.join(" ")));
    let if_stmt = (expr_strategy(), stmt_strategy(depth - 1, in_loop))
        .prop_map(|(c, s)| format!("if ({c}) {s}"));
    let if_else = (
        expr_strategy(),
        stmt_strategy(depth - 1, in_loop),
        stmt_strategy(depth - 1, in_loop),
    )
        .prop_map(|(c, t, e)| format!("if ({c}) {t} else {e}"));
    let while_stmt = (expr_strategy(), stmt_strategy(depth - 1, true))
        .prop_map(|(c, s)| format!("while ({c}) {s}"));
    let ret = expr_strategy().prop_map(|e| format!("return {e};"));

    prop_oneof![
        3 => leaf,
        2 => block,
        1 => if_stmt,
        1 => if_else,
        2 => while_stmt,
        1 => ret,
    ]
    .boxed()
}

fn function_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(stmt_strategy(3, false), 0..5).prop_map(|stmts| {
        format!(
            "int f(int a, int b) {{ int c; {} return c; }}",
            stmts.join(" ")
        )
    })
}

// -- Harness --

struct Outcome {
    ok: bool,
    codes: Vec<ErrorCode>,
}

/// Lower `source`, checking generator state and module well-formedness.
fn check(source: &str) -> Outcome {
    let mut queue = DiagnosticQueue::new();
    let (ast, root) = minic_parse::parse(source, &mut queue).expect("generated source parses");

    let mut generator = IrGenerator::new(&ast, GenOptions::default(), &mut queue);
    let ok = generator.run(root).is_ok();

    assert_eq!(generator.loop_depth(), 0, "loop stack leaked: {source}");
    assert_eq!(generator.module().scope_depth(), 1, "scope leaked: {source}");
    assert_eq!(generator.module().current_function(), None);

    if ok {
        let module = generator.module();
        assert_eq!(verify_module(module), vec![], "invalid IR for: {source}");
        for func in module.functions() {
            let code: Vec<&Instr> = func.instrs().collect();
            assert!(matches!(code.first(), Some(Instr::Entry)));
            assert!(matches!(code.last(), Some(Instr::Exit(_))));
            let boundaries = code
                .iter()
                .filter(|i| matches!(i, Instr::Entry | Instr::Exit(_)))
                .count();
            assert_eq!(boundaries, 2);
        }
    }

    drop(generator);
    Outcome {
        ok,
        codes: queue.codes(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Well-scoped programs always lower to verified IR.
    #[test]
    fn prop_generated_functions_verify(source in function_strategy()) {
        let outcome = check(&source);
        prop_assert!(outcome.ok, "generation failed for {}: {:?}", source, outcome.codes);
    }

    /// An undefined name anywhere fails cleanly with state restored.
    #[test]
    fn prop_undefined_variable_restores_state(
        stmts in prop::collection::vec(stmt_strategy(2, false), 0..4),
        at in 0usize..5,
    ) {
        let mut stmts = stmts;
        let at = at.min(stmts.len());
        stmts.insert(at, "while (a) { { zz = 1; } }".to_owned());
        let source = format!("int f(int a, int b) {{ int c; {} return c; }}", stmts.join(" "));

        let outcome = check(&source);
        prop_assert!(!outcome.ok);
        prop_assert_eq!(outcome.codes, vec![ErrorCode::E2004]);
    }

    /// Functions without loops never contain a stray `break`.
    #[test]
    fn prop_break_outside_loop_fails(
        stmts in prop::collection::vec(stmt_strategy(2, false), 0..4),
    ) {
        let source = format!(
            "void f(int a, int b) {{ int c; {} {{ break; }} }}",
            stmts.join(" ").replace("return", "c =")
        );
        let outcome = check(&source);
        prop_assert!(!outcome.ok);
        prop_assert_eq!(outcome.codes, vec![ErrorCode::E2007]);
    }
}
