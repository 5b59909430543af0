//! Call lowering.

use minic_diagnostic::{undefined_function, ErrorCode};
use minic_ir::ast::{NodeId, NodeKind};
use smallvec::SmallVec;

use super::{GenResult, IrGenerator, Lowered};

impl IrGenerator<'_> {
    /// `FuncCall[Ident, RealParams[args...]]`.
    ///
    /// The callee must already be defined. Arguments are evaluated left to
    /// right; the argument count must match the callee's parameter count.
    pub(super) fn lower_call(&mut self, node: NodeId) -> GenResult {
        let ast = self.ast;
        let name = self.ident_child(node, 0)?;
        let args_node = self.child(node, 1)?;
        if !matches!(ast.kind(args_node), NodeKind::RealParams) {
            return Err(self.malformed(args_node, "call expects an argument list".to_owned()));
        }

        let Some(callee) = self.module.find_function(name) else {
            let line = ast.line(node);
            return Err(self.queue.emit(undefined_function(line, name)));
        };

        let mut out = Lowered::empty();
        let mut args: SmallVec<[_; 4]> = SmallVec::new();
        for &arg_node in ast.children(args_node) {
            args.push(self.lower_value(arg_node, &mut out)?);
        }

        let callee_fn = self.module.function(callee);
        let expected = callee_fn.params().len();
        let ret_ty = callee_fn.return_type();
        if args.len() != expected {
            let supplied = args.len();
            let plural = if expected == 1 { "" } else { "s" };
            let verb = if supplied == 1 { "was" } else { "were" };
            let message = format!(
                "`{name}` takes {expected} argument{plural} but {supplied} {verb} supplied"
            );
            return Err(self.error(node, ErrorCode::E2006, message));
        }

        let inst = self.build(node, |f| f.call(callee, &args, ret_ty))?;
        out.push(inst);
        let func = self.current(node)?;
        out.value = self.module.function(func).inst_value(inst);
        Ok(out)
    }
}

#[cfg(test)]
mod tests;
