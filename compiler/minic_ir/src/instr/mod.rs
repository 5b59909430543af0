//! The instruction set and the errors raised while building instructions.

use smallvec::SmallVec;

use crate::{FuncId, LabelId, Type, Value};

/// Binary operators with their IR mnemonics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Eq => "icmp_eq",
            BinaryOp::Ne => "icmp_ne",
            BinaryOp::Lt => "icmp_lt",
            BinaryOp::Le => "icmp_le",
            BinaryOp::Gt => "icmp_gt",
            BinaryOp::Ge => "icmp_ge",
        }
    }

    /// Comparisons produce `bool`; everything else produces `int`.
    #[inline]
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    #[inline]
    pub fn result_type(self) -> Type {
        if self.is_relational() {
            Type::Bool
        } else {
            Type::Int
        }
    }
}

/// A single IR instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// Function prologue. First instruction of every function.
    Entry,
    /// Function epilogue, returning the slot value if any. Last instruction.
    Exit(Option<Value>),
    Label(LabelId),
    Goto(LabelId),
    CondBr {
        cond: Value,
        if_true: LabelId,
        if_false: LabelId,
    },
    Move {
        dst: Value,
        src: Value,
    },
    Binary {
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
        ty: Type,
    },
    /// `ty == Type::Void` means the call yields no value.
    Call {
        callee: FuncId,
        args: SmallVec<[Value; 4]>,
        ty: Type,
    },
}

impl Instr {
    /// Type of the value this instruction defines (`void` if none).
    pub fn result_type(&self) -> Type {
        match self {
            Instr::Binary { ty, .. } | Instr::Call { ty, .. } => *ty,
            _ => Type::Void,
        }
    }

    /// Labels this instruction may transfer control to.
    pub fn branch_targets(&self) -> SmallVec<[LabelId; 2]> {
        match self {
            Instr::Goto(target) => smallvec::smallvec![*target],
            Instr::CondBr {
                if_true, if_false, ..
            } => smallvec::smallvec![*if_true, *if_false],
            _ => SmallVec::new(),
        }
    }

    /// Values read by this instruction, in operand order.
    pub fn operands(&self) -> SmallVec<[Value; 4]> {
        match self {
            Instr::Entry | Instr::Label(_) | Instr::Goto(_) | Instr::Exit(None) => SmallVec::new(),
            Instr::Exit(Some(v)) => smallvec::smallvec![*v],
            Instr::CondBr { cond, .. } => smallvec::smallvec![*cond],
            Instr::Move { src, .. } => smallvec::smallvec![*src],
            Instr::Binary { lhs, rhs, .. } => smallvec::smallvec![*lhs, *rhs],
            Instr::Call { args, .. } => args.clone(),
        }
    }

    #[inline]
    pub fn is_goto(&self) -> bool {
        matches!(self, Instr::Goto(_))
    }
}

/// Rejected instruction construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    #[error("operand of `{op}` must be numeric, found `{found}`")]
    NonNumericOperand { op: &'static str, found: Type },
    #[error("{context} needs a value, but the expression has type `void`")]
    VoidValue { context: &'static str },
    #[error("destination of a move must be a variable")]
    NotAssignable,
    #[error("{what} belongs to a different function")]
    ForeignReference { what: &'static str },
    #[error("{what} does not exist in this function")]
    UnknownHandle { what: &'static str },
    #[error("label `{name}` is already placed")]
    LabelAlreadyPlaced { name: String },
}
