#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::ValueKind;

fn module_with_function(name: &str) -> (Module, FuncId) {
    let mut module = Module::new();
    let id = module.new_function(name, Type::Int).unwrap();
    module.set_current_function(Some(id)).unwrap();
    (module, id)
}

#[test]
fn new_module_has_only_global_frame() {
    let module = Module::new();
    assert_eq!(module.scope_depth(), 1);
    assert_eq!(module.current_function(), None);
    assert!(module.functions().is_empty());
}

#[test]
fn enter_and_leave_are_paired() {
    let mut module = Module::new();
    module.enter_scope();
    module.enter_scope();
    assert_eq!(module.scope_depth(), 3);
    module.leave_scope();
    module.leave_scope();
    assert_eq!(module.scope_depth(), 1);
}

#[test]
fn with_scope_leaves_on_failure() {
    let mut module = Module::new();
    let result: Result<(), &str> = module.with_scope(|m| {
        assert_eq!(m.scope_depth(), 2);
        Err("boom")
    });
    assert_eq!(result, Err("boom"));
    assert_eq!(module.scope_depth(), 1);
}

#[test]
fn inner_frame_shadows_outer() {
    let (mut module, _) = module_with_function("main");
    let outer = module.new_var_value(Type::Int, Some("a")).unwrap();
    module.enter_scope();
    let inner = module.new_var_value(Type::Int, Some("a")).unwrap();
    assert_ne!(outer, inner);
    assert_eq!(module.find_var_value("a"), Some(inner));
    module.leave_scope();
    assert_eq!(module.find_var_value("a"), Some(outer));
}

#[test]
fn duplicate_in_same_frame_is_rejected() {
    let (mut module, _) = module_with_function("main");
    module.new_var_value(Type::Int, Some("a")).unwrap();
    assert_eq!(
        module.new_var_value(Type::Int, Some("a")),
        Err(ScopeError::DuplicateVariable("a".to_owned()))
    );
}

#[test]
fn lookup_of_missing_name_is_none() {
    let module = Module::new();
    assert_eq!(module.find_var_value("nope"), None);
}

#[test]
fn top_level_variables_are_globals() {
    let mut module = Module::new();
    let g = module.new_var_value(Type::Int, Some("g")).unwrap();
    assert!(matches!(g.kind(), ValueKind::Global(_)));
    assert_eq!(module.globals().len(), 1);
    assert_eq!(module.globals()[0].name, "g");

    let id = module.new_function("main", Type::Void).unwrap();
    module.set_current_function(Some(id)).unwrap();
    module.enter_scope();
    assert_eq!(module.find_var_value("g"), Some(g));
    module.leave_scope();
}

#[test]
fn temporaries_need_a_function() {
    let mut module = Module::new();
    assert_eq!(
        module.new_var_value(Type::Int, None),
        Err(ScopeError::TemporaryOutsideFunction)
    );

    let (mut module, id) = module_with_function("main");
    let tmp = module.new_var_value(Type::Int, None).unwrap();
    assert_eq!(tmp.owner(), Some(id));
    assert_eq!(module.function(id).locals().len(), 1);
    assert_eq!(module.function(id).locals()[0].name, None);
}

#[test]
fn params_bind_in_current_frame() {
    let (mut module, id) = module_with_function("f");
    module.enter_scope();
    let a = module.new_param(Type::Int, "a").unwrap();
    assert_eq!(module.find_var_value("a"), Some(a));
    assert_eq!(module.function(id).params().len(), 1);
    assert_eq!(
        module.new_param(Type::Int, "a"),
        Err(ScopeError::DuplicateVariable("a".to_owned()))
    );
    module.leave_scope();

    let mut empty = Module::new();
    assert_eq!(
        empty.new_param(Type::Int, "x"),
        Err(ScopeError::ParamOutsideFunction)
    );
}

#[test]
fn functions_are_unique_by_name() {
    let mut module = Module::new();
    let f = module.new_function("f", Type::Int).unwrap();
    assert_eq!(module.find_function("f"), Some(f));
    assert_eq!(module.find_function("g"), None);
    assert_eq!(
        module.new_function("f", Type::Void),
        Err(ScopeError::DuplicateFunction("f".to_owned()))
    );
}

#[test]
fn nested_functions_are_rejected() {
    let (mut module, _) = module_with_function("outer");
    let inner = module.new_function("inner", Type::Int).unwrap();
    assert_eq!(
        module.set_current_function(Some(inner)),
        Err(ScopeError::NestedFunction {
            active: "outer".to_owned()
        })
    );
    module.set_current_function(None).unwrap();
    assert!(module.set_current_function(Some(inner)).is_ok());
    assert_eq!(module.current_function(), Some(inner));
}

#[test]
fn constants() {
    let module = Module::new();
    assert_eq!(module.new_const_int(42), Value::const_int(42));
}
