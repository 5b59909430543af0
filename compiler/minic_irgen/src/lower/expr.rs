//! Expression lowering: leaves, operators, short-circuit logic and
//! assignment.
//!
//! `&&`, `||` and `!` materialise their result in an anonymous `int`
//! temporary through branches, so they never produce an instruction value.

use minic_diagnostic::{undefined_variable, ErrorCode};
use minic_ir::ast::{NodeId, NodeKind};
use minic_ir::{BinaryOp, InstId, Value};

use super::{GenResult, IrGenerator, Lowered};

impl IrGenerator<'_> {
    // ── Leaves ─────────────────────────────────────────────────

    #[expect(
        clippy::cast_possible_wrap,
        reason = "literals above i32::MAX wrap like a C `(int)` cast"
    )]
    pub(super) fn lower_int_literal(&self, n: u32) -> Lowered {
        Lowered::with_value(self.module.new_const_int(n as i32))
    }

    pub(super) fn lower_ident(&mut self, node: NodeId, name: &str) -> GenResult {
        match self.module.find_var_value(name) {
            Some(value) => Ok(Lowered::with_value(value)),
            None => {
                let line = self.ast.line(node);
                Err(self.queue.emit(undefined_variable(line, name)))
            }
        }
    }

    // ── Arithmetic and comparison ──────────────────────────────

    /// Left operand fully, then right, then the operation.
    pub(super) fn lower_binary(&mut self, node: NodeId, op: BinaryOp) -> GenResult {
        let lhs_node = self.child(node, 0)?;
        let rhs_node = self.child(node, 1)?;

        let mut out = Lowered::empty();
        let lhs = self.lower_value(lhs_node, &mut out)?;
        let rhs = self.lower_value(rhs_node, &mut out)?;

        let inst = self.build(node, |f| f.binary(op, lhs, rhs))?;
        out.push(inst);
        out.value = self.value_of(node, inst)?;
        Ok(out)
    }

    /// `-x` lowers to `sub 0, x`.
    pub(super) fn lower_neg(&mut self, node: NodeId) -> GenResult {
        let operand_node = self.child(node, 0)?;

        let mut out = Lowered::empty();
        let operand = self.lower_value(operand_node, &mut out)?;
        let zero = self.module.new_const_int(0);

        let inst = self.build(node, |f| f.binary(BinaryOp::Sub, zero, operand))?;
        out.push(inst);
        out.value = self.value_of(node, inst)?;
        Ok(out)
    }

    fn value_of(&mut self, node: NodeId, inst: InstId) -> GenResult<Option<Value>> {
        let id = self.current(node)?;
        Ok(self.module.function(id).inst_value(inst))
    }

    // ── Short-circuit logic ────────────────────────────────────

    /// ```text
    ///     <lhs>
    ///     bc lhs, right, false
    /// false:
    ///     tmp = 0
    ///     goto end
    /// right:
    ///     <rhs>
    ///     tmp = rhs
    /// end:
    /// ```
    pub(super) fn lower_and(&mut self, node: NodeId) -> GenResult {
        let lhs_node = self.child(node, 0)?;
        let rhs_node = self.child(node, 1)?;

        let right = self.new_label(node)?;
        let false_label = self.new_label(node)?;
        let end = self.new_label(node)?;
        let tmp = self.new_temp(node)?;
        let zero = self.module.new_const_int(0);

        let mut out = Lowered::empty();
        let lhs = self.lower_value(lhs_node, &mut out)?;

        let head = self.build(node, |f| {
            Ok([
                f.cond_br(lhs, right, false_label)?,
                f.place_label(false_label)?,
                f.mov(tmp, zero)?,
                f.goto(end)?,
                f.place_label(right)?,
            ])
        })?;
        out.insts.extend(head);

        let rhs = self.lower_value(rhs_node, &mut out)?;
        let tail = self.build(node, |f| Ok([f.mov(tmp, rhs)?, f.place_label(end)?]))?;
        out.insts.extend(tail);

        out.value = Some(tmp);
        Ok(out)
    }

    /// ```text
    ///     <lhs>
    ///     bc lhs, true, right
    /// true:
    ///     tmp = 1
    ///     goto end
    /// right:
    ///     <rhs>
    ///     tmp = rhs
    /// end:
    /// ```
    pub(super) fn lower_or(&mut self, node: NodeId) -> GenResult {
        let lhs_node = self.child(node, 0)?;
        let rhs_node = self.child(node, 1)?;

        let true_label = self.new_label(node)?;
        let right = self.new_label(node)?;
        let end = self.new_label(node)?;
        let tmp = self.new_temp(node)?;
        let one = self.module.new_const_int(1);

        let mut out = Lowered::empty();
        let lhs = self.lower_value(lhs_node, &mut out)?;

        let head = self.build(node, |f| {
            Ok([
                f.cond_br(lhs, true_label, right)?,
                f.place_label(true_label)?,
                f.mov(tmp, one)?,
                f.goto(end)?,
                f.place_label(right)?,
            ])
        })?;
        out.insts.extend(head);

        let rhs = self.lower_value(rhs_node, &mut out)?;
        let tail = self.build(node, |f| Ok([f.mov(tmp, rhs)?, f.place_label(end)?]))?;
        out.insts.extend(tail);

        out.value = Some(tmp);
        Ok(out)
    }

    /// ```text
    ///     <operand>
    ///     bc operand, false, true
    /// false:
    ///     tmp = 0
    ///     goto end
    /// true:
    ///     tmp = 1
    /// end:
    /// ```
    pub(super) fn lower_not(&mut self, node: NodeId) -> GenResult {
        let operand_node = self.child(node, 0)?;

        let false_label = self.new_label(node)?;
        let true_label = self.new_label(node)?;
        let end = self.new_label(node)?;
        let tmp = self.new_temp(node)?;
        let zero = self.module.new_const_int(0);
        let one = self.module.new_const_int(1);

        let mut out = Lowered::empty();
        let operand = self.lower_value(operand_node, &mut out)?;

        let insts = self.build(node, |f| {
            Ok([
                f.cond_br(operand, false_label, true_label)?,
                f.place_label(false_label)?,
                f.mov(tmp, zero)?,
                f.goto(end)?,
                f.place_label(true_label)?,
                f.mov(tmp, one)?,
                f.place_label(end)?,
            ])
        })?;
        out.insts.extend(insts);

        out.value = Some(tmp);
        Ok(out)
    }

    // ── Assignment ─────────────────────────────────────────────

    /// Right-hand side, then the target, then the move. The expression's
    /// value is the destination slot, so `a = b = 1` chains.
    pub(super) fn lower_assign(&mut self, node: NodeId) -> GenResult {
        let target_node = self.child(node, 0)?;
        let value_node = self.child(node, 1)?;

        if !matches!(self.ast.kind(target_node), NodeKind::Ident(_)) {
            let what = self.ast.kind(target_node).name();
            return Err(self.error(
                target_node,
                ErrorCode::E2010,
                format!("cannot assign to {what}"),
            ));
        }

        let target = self.lower(target_node)?;
        let mut out = Lowered::empty();
        let src = self.lower_value(value_node, &mut out)?;
        let Some(dst) = out.append(target) else {
            return Err(self.malformed(target_node, "assignment target has no slot".to_owned()));
        };

        let inst = self.build(node, |f| f.mov(dst, src))?;
        out.push(inst);
        out.value = Some(dst);
        Ok(out)
    }
}
