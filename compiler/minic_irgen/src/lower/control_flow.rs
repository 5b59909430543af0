//! Control flow lowering: blocks, `if`, `while`, `break`/`continue` and
//! `return`.
//!
//! Every construct lowers to labels and branches inside the current
//! function. Loop targets live on the generator's loop stack; `return`
//! always jumps to the function's single exit label.

use minic_diagnostic::ErrorCode;
use minic_ir::ast::NodeId;
use minic_ir::Type;
use tracing::trace;

use super::{GenResult, IrGenerator, Lowered};

impl IrGenerator<'_> {
    // ── Blocks ─────────────────────────────────────────────────

    /// Lower children in order, inside a new scope frame when `needs_scope`.
    pub(super) fn lower_block(&mut self, node: NodeId, needs_scope: bool) -> GenResult {
        if needs_scope {
            self.with_scope(|this| this.lower_children(node))
        } else {
            self.lower_children(node)
        }
    }

    /// Lower every child of `node`, concatenating their instructions.
    pub(super) fn lower_children(&mut self, node: NodeId) -> GenResult {
        let ast = self.ast;
        let mut out = Lowered::empty();
        for &child in ast.children(node) {
            let lowered = self.lower(child)?;
            out.append(lowered);
        }
        Ok(out)
    }

    // ── Conditionals ───────────────────────────────────────────

    /// ```text
    ///     <cond>
    ///     bc cond, then, end
    /// then:
    ///     <then>
    /// end:
    /// ```
    pub(super) fn lower_if(&mut self, node: NodeId) -> GenResult {
        let cond_node = self.child(node, 0)?;
        let then_node = self.child(node, 1)?;

        let then_label = self.new_label(node)?;
        let end = self.new_label(node)?;

        let mut out = Lowered::empty();
        let cond = self.lower_value(cond_node, &mut out)?;
        let head = self.build(node, |f| {
            Ok([f.cond_br(cond, then_label, end)?, f.place_label(then_label)?])
        })?;
        out.insts.extend(head);

        let then = self.lower(then_node)?;
        out.append(then);

        let tail = self.build(node, |f| f.place_label(end))?;
        out.push(tail);
        Ok(out)
    }

    /// ```text
    ///     <cond>
    ///     bc cond, then, else
    /// then:
    ///     <then>
    ///     goto end
    /// else:
    ///     <else>
    ///     goto end
    /// end:
    /// ```
    pub(super) fn lower_if_else(&mut self, node: NodeId) -> GenResult {
        let cond_node = self.child(node, 0)?;
        let then_node = self.child(node, 1)?;
        let else_node = self.child(node, 2)?;

        let then_label = self.new_label(node)?;
        let else_label = self.new_label(node)?;
        let end = self.new_label(node)?;

        let mut out = Lowered::empty();
        let cond = self.lower_value(cond_node, &mut out)?;
        let head = self.build(node, |f| {
            Ok([
                f.cond_br(cond, then_label, else_label)?,
                f.place_label(then_label)?,
            ])
        })?;
        out.insts.extend(head);

        let then = self.lower(then_node)?;
        out.append(then);
        let middle = self.build(node, |f| Ok([f.goto(end)?, f.place_label(else_label)?]))?;
        out.insts.extend(middle);

        let otherwise = self.lower(else_node)?;
        out.append(otherwise);
        let tail = self.build(node, |f| Ok([f.goto(end)?, f.place_label(end)?]))?;
        out.insts.extend(tail);
        Ok(out)
    }

    // ── Loops ──────────────────────────────────────────────────

    /// ```text
    ///     goto cond
    /// cond:
    ///     <cond>
    ///     bc cond, body, end
    /// body:
    ///     <body>
    ///     goto cond
    /// end:
    /// ```
    ///
    /// `(cond, end)` are the `continue`/`break` targets while the condition
    /// and body are lowered.
    pub(super) fn lower_while(&mut self, node: NodeId) -> GenResult {
        let cond_node = self.child(node, 0)?;
        let body_node = self.child(node, 1)?;

        let cond_label = self.new_label(node)?;
        let body_label = self.new_label(node)?;
        let end = self.new_label(node)?;

        self.with_loop(cond_label, end, |this| {
            let mut out = Lowered::empty();
            let head = this.build(node, |f| Ok([f.goto(cond_label)?, f.place_label(cond_label)?]))?;
            out.insts.extend(head);

            let cond = this.lower_value(cond_node, &mut out)?;
            let branch = this.build(node, |f| {
                Ok([
                    f.cond_br(cond, body_label, end)?,
                    f.place_label(body_label)?,
                ])
            })?;
            out.insts.extend(branch);

            let body = this.lower(body_node)?;
            out.append(body);

            let tail = this.build(node, |f| Ok([f.goto(cond_label)?, f.place_label(end)?]))?;
            out.insts.extend(tail);
            Ok(out)
        })
    }

    pub(super) fn lower_break(&mut self, node: NodeId) -> GenResult {
        let Some(&target) = self.loops.break_targets.last() else {
            return Err(self.error(node, ErrorCode::E2007, "`break` outside of a loop".to_owned()));
        };
        let inst = self.build(node, |f| f.goto(target))?;
        Ok(Lowered {
            insts: vec![inst],
            value: None,
        })
    }

    pub(super) fn lower_continue(&mut self, node: NodeId) -> GenResult {
        let Some(&target) = self.loops.continue_targets.last() else {
            return Err(self.error(
                node,
                ErrorCode::E2008,
                "`continue` outside of a loop".to_owned(),
            ));
        };
        let inst = self.build(node, |f| f.goto(target))?;
        Ok(Lowered {
            insts: vec![inst],
            value: None,
        })
    }

    // ── Return ─────────────────────────────────────────────────

    /// Move the value (if any) into the return slot, then jump to the exit
    /// label.
    pub(super) fn lower_return(&mut self, node: NodeId) -> GenResult {
        let Some(func_id) = self.module.current_function() else {
            return Err(self.error(
                node,
                ErrorCode::E2011,
                "`return` outside of a function".to_owned(),
            ));
        };
        let func = self.module.function(func_id);
        let (slot, exit, return_type) = (func.return_slot(), func.exit_label(), func.return_type());
        let Some(exit) = exit else {
            return Err(self.malformed(node, "function has no exit label".to_owned()));
        };

        let value_node = self.ast.child(node, 0);
        if let (Some(value_node), None) = (value_node, slot) {
            debug_assert_eq!(return_type, Type::Void);
            return Err(self.error(
                value_node,
                ErrorCode::E2011,
                "cannot return a value from a `void` function".to_owned(),
            ));
        }

        let mut out = self.lower_opt(value_node)?;
        match (value_node, slot) {
            (Some(value_node), Some(slot)) => {
                let Some(value) = out.value.take() else {
                    return Err(self.no_value(value_node));
                };
                let inst = self.build(node, |f| f.mov(slot, value))?;
                out.push(inst);
            }
            (None, Some(_)) => {
                trace!(line = self.ast.line(node), "bare return from non-void function");
            }
            _ => {}
        }

        let inst = self.build(node, |f| f.goto(exit))?;
        out.push(inst);
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
