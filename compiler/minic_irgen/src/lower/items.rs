//! Top-level items: the compile unit, function definitions, parameters and
//! variable declarations.

use minic_diagnostic::{ErrorCode, ErrorGuaranteed};
use minic_ir::ast::{NodeId, NodeKind};
use minic_ir::verify::verify_function;
use minic_ir::{FuncId, InstId, ScopeError, Type};
use tracing::debug;

use super::{GenResult, IrGenerator, Lowered};

impl IrGenerator<'_> {
    pub(super) fn lower_compile_unit(&mut self, node: NodeId) -> GenResult {
        debug_assert!(self.module.current_function().is_none());
        self.lower_children(node)
    }

    pub(super) fn lower_decl_stmt(&mut self, node: NodeId) -> GenResult {
        self.lower_children(node)
    }

    /// `VarDecl[Type, Ident]`: a fresh named slot, local inside a function
    /// and global outside one. There are no initialisers.
    pub(super) fn lower_var_decl(&mut self, node: NodeId) -> GenResult {
        let ty = self.type_child(node, 0)?;
        let name = self.ident_child(node, 1)?;
        self.reject_void(node, ty, "variable", name)?;

        self.module
            .new_var_value(ty, Some(name))
            .map_err(|err| self.scope_error(node, &err))?;
        Ok(Lowered::empty())
    }

    // ── Functions ──────────────────────────────────────────────

    /// `FuncDef[Type, Ident, FormalParams, Block]`.
    ///
    /// ```text
    ///     entry
    ///     <body>
    ///     goto exit        ; only if the body does not end in a jump
    /// exit:
    ///     exit ret
    /// ```
    pub(super) fn lower_func_def(&mut self, node: NodeId) -> GenResult {
        let return_type = self.type_child(node, 0)?;
        let name = self.ident_child(node, 1)?;
        let params_node = self.child(node, 2)?;
        let body_node = self.child(node, 3)?;
        if !matches!(self.ast.kind(body_node), NodeKind::Block { .. }) {
            return Err(self.malformed(body_node, "function body must be a block".to_owned()));
        }

        if let Some(active) = self.module.current_function() {
            let active = self.module.function(active).name().to_owned();
            return Err(self.scope_error(node, &ScopeError::NestedFunction { active }));
        }

        let id = self
            .module
            .new_function(name, return_type)
            .map_err(|err| self.scope_error(node, &err))?;
        self.module
            .set_current_function(Some(id))
            .map_err(|err| self.scope_error(node, &err))?;
        debug!(function = name, ret = %return_type, "lowering function");

        let result =
            self.with_scope(|this| this.lower_function_body(node, id, params_node, body_node));

        // Clearing the active function cannot fail.
        let cleared = self.module.set_current_function(None);
        debug_assert!(cleared.is_ok());
        result?;

        if self.options.verify {
            self.verify(node, id)?;
        }

        let func = self.module.function(id);
        debug!(
            function = name,
            instructions = func.code().len(),
            locals = func.locals().len(),
            "lowered function"
        );
        Ok(Lowered::empty())
    }

    fn lower_function_body(
        &mut self,
        node: NodeId,
        id: FuncId,
        params_node: NodeId,
        body_node: NodeId,
    ) -> GenResult<()> {
        let entry = self.build(node, |f| Ok(f.entry()))?;
        let exit_label = self.new_label(node)?;
        self.build(node, |f| f.set_exit_label(exit_label))?;

        self.lower(params_node)?;

        let return_type = self.module.function(id).return_type();
        let return_slot = if return_type.is_void() {
            None
        } else {
            let slot = self
                .module
                .new_var_value(return_type, None)
                .map_err(|err| self.scope_error(node, &err))?;
            self.build(node, |f| f.set_return_slot(slot))?;
            Some(slot)
        };

        // The function frame is already open; the body block shares it.
        let body = self.lower_children(body_node)?;

        let mut code: Vec<InstId> = Vec::with_capacity(body.insts.len() + 4);
        code.push(entry);
        code.extend(body.insts);

        let ends_in_jump = code
            .last()
            .is_some_and(|&last| self.module.function(id).inst(last).is_goto());
        if !ends_in_jump {
            code.push(self.build(node, |f| f.goto(exit_label))?);
        }
        let tail = self.build(node, |f| {
            Ok([f.place_label(exit_label)?, f.exit(return_slot)?])
        })?;
        code.extend(tail);

        self.build(node, |f| f.append(&code))
    }

    /// Report every verifier violation for `id` as an internal error.
    fn verify(&mut self, node: NodeId, id: FuncId) -> GenResult<()> {
        let violations = verify_function(self.module.function(id));
        let mut first: Option<ErrorGuaranteed> = None;
        for violation in violations {
            let name = self.module.function(id).name().to_owned();
            let guarantee = self.error(
                node,
                ErrorCode::E9002,
                format!("generated code for `{name}` is invalid: {violation}"),
            );
            first.get_or_insert(guarantee);
        }
        match first {
            Some(guarantee) => Err(guarantee),
            None => Ok(()),
        }
    }

    // ── Parameters ─────────────────────────────────────────────

    pub(super) fn lower_formal_params(&mut self, node: NodeId) -> GenResult {
        self.lower_children(node)
    }

    /// `FormalParam[Type, Ident]`: binds the parameter in the function
    /// frame. No copy instructions are emitted.
    pub(super) fn lower_formal_param(&mut self, node: NodeId) -> GenResult {
        let ty = self.type_child(node, 0)?;
        let name = self.ident_child(node, 1)?;
        self.reject_void(node, ty, "parameter", name)?;

        self.module
            .new_param(ty, name)
            .map_err(|err| self.scope_error(node, &err))?;
        Ok(Lowered::empty())
    }

    fn reject_void(&mut self, node: NodeId, ty: Type, what: &str, name: &str) -> GenResult<()> {
        if ty.is_void() {
            return Err(self.error(
                node,
                ErrorCode::E2012,
                format!("{what} `{name}` declared `void`"),
            ));
        }
        Ok(())
    }
}
