//! The module: function table, global variables and nested name scopes.
//!
//! # Scope frames
//!
//! The scope stack always holds at least one frame, the global frame. Blocks
//! push and pop frames in strict pairs; the global frame is never popped.
//! Lookups walk frames innermost-first, so inner declarations shadow outer
//! ones. Redeclaring a name in the same frame is an error.

use rustc_hash::FxHashMap;

use crate::ids::next_raw;
use crate::{FuncId, Function, GlobalId, Type, Value};

/// A module-level variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalInfo {
    pub name: String,
    pub ty: Type,
}

/// Rejected symbol-table operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("redefinition of `{0}` in the same scope")]
    DuplicateVariable(String),
    #[error("function `{0}` is already defined")]
    DuplicateFunction(String),
    #[error("cannot start a function while `{active}` is still being generated")]
    NestedFunction { active: String },
    #[error("temporaries can only be created inside a function")]
    TemporaryOutsideFunction,
    #[error("parameters can only be declared inside a function")]
    ParamOutsideFunction,
}

type Frame = FxHashMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    functions: Vec<Function>,
    function_index: FxHashMap<String, FuncId>,
    globals: Vec<GlobalInfo>,
    /// `frames[0]` is the global frame.
    frames: Vec<Frame>,
    current: Option<FuncId>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        Module {
            functions: Vec::new(),
            function_index: FxHashMap::default(),
            globals: Vec::new(),
            frames: vec![Frame::default()],
            current: None,
        }
    }

    // Scopes

    /// Push a fresh name frame.
    pub fn enter_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame. The global frame is never popped.
    pub fn leave_scope(&mut self) {
        debug_assert!(self.frames.len() > 1, "leave_scope without enter_scope");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Run `f` inside a new frame, leaving it whether `f` succeeds or not.
    pub fn with_scope<T, E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.enter_scope();
        let result = f(self);
        self.leave_scope();
        result
    }

    /// Number of active frames, including the global frame.
    #[inline]
    pub fn scope_depth(&self) -> usize {
        self.frames.len()
    }

    /// Allocate a storage slot.
    ///
    /// Inside a function this creates a local of the current function,
    /// otherwise a global. A named slot is bound in the innermost frame;
    /// `name == None` creates an anonymous temporary, which needs an active
    /// function.
    pub fn new_var_value(&mut self, ty: Type, name: Option<&str>) -> Result<Value, ScopeError> {
        if let Some(name) = name {
            if self.innermost().contains_key(name) {
                return Err(ScopeError::DuplicateVariable(name.to_owned()));
            }
        }

        let value = match (self.current, name) {
            (Some(func), _) => self.functions[func.index()].new_local(ty, name),
            (None, Some(name)) => {
                let id = GlobalId::new(next_raw(self.globals.len()));
                self.globals.push(GlobalInfo {
                    name: name.to_owned(),
                    ty,
                });
                Value::global(id, ty)
            }
            (None, None) => return Err(ScopeError::TemporaryOutsideFunction),
        };

        if let Some(name) = name {
            self.bind(name, value);
        }
        Ok(value)
    }

    /// Declare a formal parameter of the current function.
    pub fn new_param(&mut self, ty: Type, name: &str) -> Result<Value, ScopeError> {
        let func = self.current.ok_or(ScopeError::ParamOutsideFunction)?;
        if self.innermost().contains_key(name) {
            return Err(ScopeError::DuplicateVariable(name.to_owned()));
        }
        let value = self.functions[func.index()].new_param(ty, name);
        self.bind(name, value);
        Ok(value)
    }

    /// Resolve `name`, innermost frame first.
    pub fn find_var_value(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// An `int` constant.
    #[inline]
    pub fn new_const_int(&self, value: i32) -> Value {
        Value::const_int(value)
    }

    fn innermost(&self) -> &Frame {
        // `frames` is never empty: the global frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn bind(&mut self, name: &str, value: Value) {
        let last = self.frames.len() - 1;
        self.frames[last].insert(name.to_owned(), value);
    }

    // Functions

    /// Register a new function. Names are unique; there is no overloading.
    pub fn new_function(&mut self, name: &str, return_type: Type) -> Result<FuncId, ScopeError> {
        if self.function_index.contains_key(name) {
            return Err(ScopeError::DuplicateFunction(name.to_owned()));
        }
        let id = FuncId::new(next_raw(self.functions.len()));
        self.functions
            .push(Function::new(id, name.to_owned(), return_type));
        self.function_index.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn find_function(&self, name: &str) -> Option<FuncId> {
        self.function_index.get(name).copied()
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this module.
    #[inline]
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Functions in definition order.
    #[inline]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    #[inline]
    pub fn globals(&self) -> &[GlobalInfo] {
        &self.globals
    }

    pub fn global(&self, id: GlobalId) -> &GlobalInfo {
        &self.globals[id.index()]
    }

    /// The function being generated, if any.
    #[inline]
    pub fn current_function(&self) -> Option<FuncId> {
        self.current
    }

    pub fn current_function_mut(&mut self) -> Option<&mut Function> {
        let id = self.current?;
        self.functions.get_mut(id.index())
    }

    /// Start (`Some`) or finish (`None`) generating a function.
    ///
    /// Starting one while another is active is rejected; functions do not
    /// nest.
    pub fn set_current_function(&mut self, func: Option<FuncId>) -> Result<(), ScopeError> {
        if let (Some(_), Some(active)) = (func, self.current) {
            return Err(ScopeError::NestedFunction {
                active: self.functions[active.index()].name().to_owned(),
            });
        }
        self.current = func;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
