//! AST → IR lowering.
//!
//! # Architecture
//!
//! - [`IrGenerator`] owns the [`Module`] being built, the loop-label stacks
//!   and the label counter. It dispatches on [`NodeKind`] with one
//!   exhaustive `match`.
//! - Every handler returns a [`Lowered`]: the instructions the node emits,
//!   in evaluation order, plus the value it produces (if any). Instructions
//!   are built in the current function's arena and only appended to its code
//!   list once the whole function body has been lowered.
//! - Scope frames and loop labels are pushed and popped by closure helpers
//!   (`with_scope`, `with_loop`) so they stay paired on error paths.
//!
//! Handlers live in `items.rs` (compile unit, functions, declarations),
//! `control_flow.rs` (blocks, branches, loops, return), `expr.rs`
//! (operators, assignment, leaves) and `calls.rs`.

mod calls;
mod control_flow;
mod expr;
mod items;

use minic_diagnostic::{malformed_ast, Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use minic_ir::ast::{Ast, NodeId, NodeKind};
use minic_ir::{
    BinaryOp, FuncId, Function, InstId, IrError, LabelId, Module, ScopeError, Type, Value,
};
use minic_stack::ensure_sufficient_stack;
use tracing::{trace, warn};

use crate::GenOptions;

pub(crate) type GenResult<T = Lowered> = Result<T, ErrorGuaranteed>;

// ── Lowered ─────────────────────────────────────────────────────────

/// The instructions a node lowers to and the value it produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lowered {
    pub insts: Vec<InstId>,
    pub value: Option<Value>,
}

impl Lowered {
    /// No instructions, no value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// No instructions, just a value (identifiers, literals).
    pub fn with_value(value: Value) -> Self {
        Lowered {
            insts: Vec::new(),
            value: Some(value),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, inst: InstId) {
        self.insts.push(inst);
    }

    /// Append `other`'s instructions and return its value.
    pub(crate) fn append(&mut self, other: Lowered) -> Option<Value> {
        self.insts.extend(other.insts);
        other.value
    }
}

// ── Loop stacks ─────────────────────────────────────────────────────

/// Parallel continue/break target stacks, one entry per enclosing loop.
#[derive(Debug, Default)]
struct LoopStack {
    continue_targets: Vec<LabelId>,
    break_targets: Vec<LabelId>,
}

impl LoopStack {
    fn push(&mut self, continue_target: LabelId, break_target: LabelId) {
        self.continue_targets.push(continue_target);
        self.break_targets.push(break_target);
    }

    fn pop(&mut self) {
        self.continue_targets.pop();
        self.break_targets.pop();
        debug_assert_eq!(self.continue_targets.len(), self.break_targets.len());
    }

    fn depth(&self) -> usize {
        self.continue_targets.len()
    }
}

// ── IrGenerator ─────────────────────────────────────────────────────

/// Lowers an [`Ast`] into a [`Module`].
///
/// One generator serves one compilation run: the label counter starts at
/// zero, so output is deterministic for a given tree.
pub struct IrGenerator<'a> {
    ast: &'a Ast,
    module: Module,
    queue: &'a mut DiagnosticQueue,
    options: GenOptions,
    label_counter: u32,
    loops: LoopStack,
}

impl<'a> IrGenerator<'a> {
    pub fn new(ast: &'a Ast, options: GenOptions, queue: &'a mut DiagnosticQueue) -> Self {
        IrGenerator {
            ast,
            module: Module::new(),
            queue,
            options,
            label_counter: 0,
            loops: LoopStack::default(),
        }
    }

    /// Lower the tree rooted at `root` into the module.
    pub fn run(&mut self, root: NodeId) -> Result<(), ErrorGuaranteed> {
        let lowered = self.lower(root)?;
        debug_assert!(
            lowered.insts.is_empty(),
            "top-level instructions outside any function"
        );
        Ok(())
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    /// Number of loops currently enclosing the lowering position.
    pub fn loop_depth(&self) -> usize {
        self.loops.depth()
    }

    // ── Dispatch ───────────────────────────────────────────────

    /// Lower a single node.
    ///
    /// Nesting in the tree maps to recursion here, so the stack is grown on
    /// demand.
    pub fn lower(&mut self, node: NodeId) -> GenResult {
        ensure_sufficient_stack(|| self.lower_node(node))
    }

    fn lower_node(&mut self, node: NodeId) -> GenResult {
        let ast = self.ast;
        let Some(ast_node) = ast.get(node) else {
            return Err(self
                .queue
                .emit(malformed_ast(0, format!("node {} does not exist", node.raw()))));
        };
        trace!(kind = ast_node.kind.name(), line = ast_node.line, "lower");

        match &ast_node.kind {
            // Items
            NodeKind::CompileUnit => self.lower_compile_unit(node),
            NodeKind::FuncDef => self.lower_func_def(node),
            NodeKind::FormalParams => self.lower_formal_params(node),
            NodeKind::FormalParam => self.lower_formal_param(node),
            NodeKind::DeclStmt => self.lower_decl_stmt(node),
            NodeKind::VarDecl => self.lower_var_decl(node),

            // Statements
            NodeKind::Block { needs_scope } => self.lower_block(node, *needs_scope),
            NodeKind::Return => self.lower_return(node),
            NodeKind::If => self.lower_if(node),
            NodeKind::IfElse => self.lower_if_else(node),
            NodeKind::While => self.lower_while(node),
            NodeKind::Break => self.lower_break(node),
            NodeKind::Continue => self.lower_continue(node),

            // Expressions
            NodeKind::Assign => self.lower_assign(node),
            NodeKind::FuncCall => self.lower_call(node),
            NodeKind::Add => self.lower_binary(node, BinaryOp::Add),
            NodeKind::Sub => self.lower_binary(node, BinaryOp::Sub),
            NodeKind::Mul => self.lower_binary(node, BinaryOp::Mul),
            NodeKind::Div => self.lower_binary(node, BinaryOp::Div),
            NodeKind::Mod => self.lower_binary(node, BinaryOp::Mod),
            NodeKind::Eq => self.lower_binary(node, BinaryOp::Eq),
            NodeKind::Ne => self.lower_binary(node, BinaryOp::Ne),
            NodeKind::Lt => self.lower_binary(node, BinaryOp::Lt),
            NodeKind::Le => self.lower_binary(node, BinaryOp::Le),
            NodeKind::Gt => self.lower_binary(node, BinaryOp::Gt),
            NodeKind::Ge => self.lower_binary(node, BinaryOp::Ge),
            NodeKind::And => self.lower_and(node),
            NodeKind::Or => self.lower_or(node),
            NodeKind::Neg => self.lower_neg(node),
            NodeKind::Not => self.lower_not(node),
            NodeKind::IntLiteral(n) => Ok(self.lower_int_literal(*n)),
            NodeKind::Ident(name) => self.lower_ident(node, name),

            // Only meaningful as part of their parent
            NodeKind::RealParams | NodeKind::Type(_) => self.unsupported(node),
        }
    }

    /// Lower an optional node. An absent node lowers to nothing.
    pub(crate) fn lower_opt(&mut self, node: Option<NodeId>) -> GenResult {
        match node {
            Some(node) => self.lower(node),
            None => Ok(Lowered::empty()),
        }
    }

    /// Lower `node` and require that it produces a value.
    pub(crate) fn lower_value(&mut self, node: NodeId, into: &mut Lowered) -> GenResult<Value> {
        let lowered = self.lower(node)?;
        match into.append(lowered) {
            Some(value) => Ok(value),
            None => Err(self.no_value(node)),
        }
    }

    #[cold]
    pub(crate) fn no_value(&mut self, node: NodeId) -> ErrorGuaranteed {
        let what = self.ast.kind(node).name();
        self.error(node, ErrorCode::E2009, format!("{what} does not produce a value"))
    }

    #[cold]
    fn unsupported(&mut self, node: NodeId) -> GenResult {
        let what = self.ast.kind(node).name();
        let line = self.ast.line(node);
        if self.options.strict_unsupported {
            return Err(self.queue.emit(
                Diagnostic::error(ErrorCode::W2001)
                    .with_message(format!("{what} cannot be lowered on its own"))
                    .at_line(line)
                    .with_note("denied by strict mode"),
            ));
        }
        warn!(kind = what, line, "node kind has no standalone lowering");
        self.queue.warning(
            ErrorCode::W2001,
            line,
            format!("{what} cannot be lowered on its own; ignored"),
        );
        Ok(Lowered::empty())
    }

    // ── Tree access ────────────────────────────────────────────

    /// The `n`th child of `node`, or an internal error if it is missing.
    pub(crate) fn child(&mut self, node: NodeId, n: usize) -> GenResult<NodeId> {
        match self.ast.child(node, n) {
            Some(child) => Ok(child),
            None => {
                let what = self.ast.kind(node).name();
                Err(self.malformed(node, format!("{what} is missing child {n}")))
            }
        }
    }

    /// The identifier payload of the `n`th child of `node`.
    pub(crate) fn ident_child(&mut self, node: NodeId, n: usize) -> GenResult<&'a str> {
        let ast = self.ast;
        let child = self.child(node, n)?;
        match ast.kind(child).as_ident() {
            Some(name) => Ok(name),
            None => {
                let what = ast.kind(node).name();
                Err(self.malformed(child, format!("{what} expects an identifier")))
            }
        }
    }

    /// The type payload of the `n`th child of `node`.
    pub(crate) fn type_child(&mut self, node: NodeId, n: usize) -> GenResult<Type> {
        let child = self.child(node, n)?;
        match self.ast.kind(child).as_type() {
            Some(ty) => Ok(ty),
            None => {
                let what = self.ast.kind(node).name();
                Err(self.malformed(child, format!("{what} expects a type")))
            }
        }
    }

    // ── Function access ────────────────────────────────────────

    /// The function being generated, or an error if there is none.
    pub(crate) fn current(&mut self, node: NodeId) -> GenResult<FuncId> {
        match self.module.current_function() {
            Some(id) => Ok(id),
            None => {
                let what = self.ast.kind(node).name();
                Err(self.malformed(node, format!("{what} outside of a function")))
            }
        }
    }

    /// Run an instruction builder on the current function, reporting any
    /// rejection against `node`.
    pub(crate) fn build<T>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut Function) -> Result<T, IrError>,
    ) -> GenResult<T> {
        let id = self.current(node)?;
        let result = f(self.module.function_mut(id));
        result.map_err(|err| self.ir_error(node, &err))
    }

    /// Allocate a fresh `.L<n>` label in the current function.
    pub(crate) fn new_label(&mut self, node: NodeId) -> GenResult<LabelId> {
        let name = format!(".L{}", self.label_counter);
        self.label_counter += 1;
        self.build(node, |f| Ok(f.new_label(name)))
    }

    /// Allocate an anonymous `int` temporary in the current function.
    pub(crate) fn new_temp(&mut self, node: NodeId) -> GenResult<Value> {
        self.module
            .new_var_value(Type::Int, None)
            .map_err(|err| self.scope_error(node, &err))
    }

    // ── Pairing helpers ────────────────────────────────────────

    /// Run `f` inside a new scope frame, leaving it on every path.
    pub(crate) fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> GenResult<T>,
    ) -> GenResult<T> {
        self.module.enter_scope();
        let result = f(self);
        self.module.leave_scope();
        result
    }

    /// Run `f` with `(continue_target, break_target)` pushed, popping on
    /// every path.
    pub(crate) fn with_loop<T>(
        &mut self,
        continue_target: LabelId,
        break_target: LabelId,
        f: impl FnOnce(&mut Self) -> GenResult<T>,
    ) -> GenResult<T> {
        self.loops.push(continue_target, break_target);
        let result = f(self);
        self.loops.pop();
        result
    }

    // ── Errors ─────────────────────────────────────────────────

    #[cold]
    pub(crate) fn error(
        &mut self,
        node: NodeId,
        code: ErrorCode,
        message: String,
    ) -> ErrorGuaranteed {
        let line = self.ast.get(node).map_or(0, |n| n.line);
        self.queue.error(code, line, message)
    }

    #[cold]
    pub(crate) fn malformed(&mut self, node: NodeId, detail: String) -> ErrorGuaranteed {
        let line = self.ast.get(node).map_or(0, |n| n.line);
        self.queue.emit(malformed_ast(line, detail))
    }

    #[cold]
    pub(crate) fn ir_error(&mut self, node: NodeId, err: &IrError) -> ErrorGuaranteed {
        let code = match err {
            IrError::NonNumericOperand { .. } | IrError::VoidValue { .. } => ErrorCode::E2009,
            IrError::NotAssignable => ErrorCode::E2010,
            IrError::ForeignReference { .. }
            | IrError::UnknownHandle { .. }
            | IrError::LabelAlreadyPlaced { .. } => ErrorCode::E9001,
        };
        self.error(node, code, err.to_string())
    }

    #[cold]
    pub(crate) fn scope_error(&mut self, node: NodeId, err: &ScopeError) -> ErrorGuaranteed {
        let code = match err {
            ScopeError::DuplicateVariable(_) => ErrorCode::E2003,
            ScopeError::DuplicateFunction(_) => ErrorCode::E2002,
            ScopeError::NestedFunction { .. } => ErrorCode::E2001,
            ScopeError::TemporaryOutsideFunction | ScopeError::ParamOutsideFunction => {
                ErrorCode::E9001
            }
        };
        self.error(node, code, err.to_string())
    }
}
