#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::{BinaryOp, Type, Value};

fn new_func() -> Function {
    Function::new(FuncId::new(0), "f".to_owned(), Type::Void)
}

#[test]
fn well_formed_function_passes() {
    let mut f = new_func();
    let exit = f.new_label(".L0");
    let seq = [
        f.entry(),
        f.goto(exit).unwrap(),
        f.place_label(exit).unwrap(),
        f.exit(None).unwrap(),
    ];
    f.append(&seq).unwrap();
    assert_eq!(verify_function(&f), vec![]);
}

#[test]
fn missing_boundaries() {
    let f = new_func();
    assert_eq!(
        verify_function(&f),
        vec![Violation::MissingEntry, Violation::MissingExit]
    );
}

#[test]
fn stray_entry_is_reported() {
    let mut f = new_func();
    let seq = [f.entry(), f.entry(), f.exit(None).unwrap()];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::MisplacedBoundary { position: 1 }]
    );
}

#[test]
fn unreferenced_label_is_reported() {
    let mut f = new_func();
    let l = f.new_label(".L3");
    let seq = [f.entry(), f.place_label(l).unwrap(), f.exit(None).unwrap()];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::UnreferencedLabel {
            label: ".L3".to_owned()
        }]
    );
}

#[test]
fn unplaced_target_is_reported() {
    let mut f = new_func();
    let l = f.new_label(".L1");
    let seq = [f.entry(), f.goto(l).unwrap(), f.exit(None).unwrap()];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::LabelNotPlaced {
            label: ".L1".to_owned()
        }]
    );
}

#[test]
fn label_emitted_twice_is_reported() {
    let mut f = new_func();
    let l = f.new_label(".L0");
    let place = f.place_label(l).unwrap();
    let seq = [f.entry(), place, f.goto(l).unwrap(), place, f.exit(None).unwrap()];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::LabelPlacedTwice {
            label: ".L0".to_owned()
        }]
    );
}

#[test]
fn duplicate_label_names_are_reported() {
    let mut f = new_func();
    let a = f.new_label(".L0");
    let b = f.new_label(".L0");
    let seq = [
        f.entry(),
        f.goto(a).unwrap(),
        f.place_label(a).unwrap(),
        f.goto(b).unwrap(),
        f.place_label(b).unwrap(),
        f.exit(None).unwrap(),
    ];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::DuplicateLabelName {
            label: ".L0".to_owned()
        }]
    );
}

#[test]
fn use_before_def_is_reported() {
    let mut f = new_func();
    let slot = f.new_local(Type::Int, None);
    let add = f
        .binary(BinaryOp::Add, Value::const_int(1), Value::const_int(2))
        .unwrap();
    let sum = f.inst_value(add).unwrap();
    let mov = f.mov(slot, sum).unwrap();
    let seq = [f.entry(), mov, add, f.exit(None).unwrap()];
    f.append(&seq).unwrap();
    assert_eq!(
        verify_function(&f),
        vec![Violation::UseBeforeDef { position: 1 }]
    );
}

#[test]
fn module_violations_carry_function_ids() {
    let mut module = Module::new();
    let id = module.new_function("broken", Type::Void).unwrap();
    let violations = verify_module(&module);
    assert_eq!(
        violations,
        vec![(id, Violation::MissingEntry), (id, Violation::MissingExit)]
    );
    assert_eq!(
        Violation::MissingEntry.to_string(),
        "code does not start with `entry`"
    );
}
