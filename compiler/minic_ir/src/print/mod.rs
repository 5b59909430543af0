//! Textual IR.
//!
//! ```text
//! declare i32 @g
//!
//! define i32 @main() {
//!   declare i32 %l0
//!   declare i32 %l1 ; a
//!   entry
//!   %l1 = 1
//!   %t2 = add %l1, 2
//!   goto label .L0
//! .L0:
//!   exit %l0
//! }
//! ```

use std::fmt;

use crate::{FuncId, Function, InstId, Instr, LabelId, Module, Value, ValueKind};

/// Renders one instruction of one function.
pub struct InstDisplay<'a> {
    module: &'a Module,
    func: &'a Function,
    id: InstId,
}

/// Renders a whole function definition.
pub struct FunctionDisplay<'a> {
    module: &'a Module,
    func: &'a Function,
}

impl Module {
    pub fn display_inst(&self, func: FuncId, id: InstId) -> InstDisplay<'_> {
        InstDisplay {
            module: self,
            func: self.function(func),
            id,
        }
    }

    pub fn display_function(&self, func: FuncId) -> FunctionDisplay<'_> {
        FunctionDisplay {
            module: self,
            func: self.function(func),
        }
    }

    /// Text of every emitted instruction of `func`, one entry per line.
    pub fn code_lines(&self, func: FuncId) -> Vec<String> {
        self.function(func)
            .code()
            .iter()
            .map(|&id| self.display_inst(func, id).to_string())
            .collect()
    }
}

struct ValueDisplay<'a> {
    module: &'a Module,
    value: Value,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.kind() {
            ValueKind::ConstInt(n) => write!(f, "{n}"),
            ValueKind::Local(id) => write!(f, "{id}"),
            ValueKind::Inst(id) => write!(f, "{id}"),
            ValueKind::Global(id) => write!(f, "@{}", self.module.global(id).name),
        }
    }
}

impl InstDisplay<'_> {
    fn value(&self, value: Value) -> ValueDisplay<'_> {
        ValueDisplay {
            module: self.module,
            value,
        }
    }

    fn label(&self, id: LabelId) -> &str {
        &self.func.label(id).name
    }
}

impl fmt::Display for InstDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.func.inst(self.id) {
            Instr::Entry => write!(f, "entry"),
            Instr::Exit(None) => write!(f, "exit"),
            Instr::Exit(Some(v)) => write!(f, "exit {}", self.value(*v)),
            Instr::Label(l) => write!(f, "{}:", self.label(*l)),
            Instr::Goto(l) => write!(f, "goto label {}", self.label(*l)),
            Instr::CondBr {
                cond,
                if_true,
                if_false,
            } => write!(
                f,
                "bc {}, label {}, label {}",
                self.value(*cond),
                self.label(*if_true),
                self.label(*if_false)
            ),
            Instr::Move { dst, src } => write!(f, "{} = {}", self.value(*dst), self.value(*src)),
            Instr::Binary { op, lhs, rhs, .. } => write!(
                f,
                "{} = {} {}, {}",
                self.id,
                op.as_str(),
                self.value(*lhs),
                self.value(*rhs)
            ),
            Instr::Call { callee, args, ty } => {
                if !ty.is_void() {
                    write!(f, "{} = ", self.id)?;
                }
                write!(f, "call {ty} @{}(", self.module.function(*callee).name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", arg.ty(), self.value(*arg))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for FunctionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let func = self.func;
        write!(f, "define {} @{}(", func.return_type(), func.name())?;
        for (i, &param) in func.params().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {param}", func.local(param).ty)?;
        }
        writeln!(f, ") {{")?;

        for (raw, local) in func.locals().iter().enumerate() {
            if local.is_param {
                continue;
            }
            write!(f, "  declare {} %l{raw}", local.ty)?;
            if let Some(name) = &local.name {
                write!(f, " ; {name}")?;
            }
            writeln!(f)?;
        }

        for &id in func.code() {
            let text = self.module.display_inst(func.id(), id);
            if matches!(func.inst(id), Instr::Label(_)) {
                writeln!(f, "{text}")?;
            } else {
                writeln!(f, "  {text}")?;
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for global in self.globals() {
            writeln!(f, "declare {} @{}", global.ty, global.name)?;
            first = false;
        }
        for func in self.functions() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "{}", self.display_function(func.id()))?;
        }
        Ok(())
    }
}
