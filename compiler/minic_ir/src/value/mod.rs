//! Semantic types and typed operands.

use std::fmt;

use crate::{FuncId, GlobalId, InstId, LocalId};

/// The three MiniC types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// Result of a relational comparison.
    Bool,
    Void,
}

impl Type {
    /// `int` and `bool` can be used as arithmetic/branch operands.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Bool)
    }

    #[inline]
    pub fn is_void(self) -> bool {
        matches!(self, Type::Void)
    }

    /// Source-level spelling (`int`, `bool`, `void`).
    pub fn keyword(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Bool => "bool",
            Type::Void => "void",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "i32"),
            Type::Bool => write!(f, "i1"),
            Type::Void => write!(f, "void"),
        }
    }
}

/// What a [`Value`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    ConstInt(i32),
    Local(LocalId),
    Global(GlobalId),
    /// The result of a `Binary` or non-void `Call` instruction.
    Inst(InstId),
}

/// A typed operand.
///
/// Only constants can be created freely; slots and instruction results are
/// handed out by [`Module`](crate::Module) and [`Function`](crate::Function).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    kind: ValueKind,
    ty: Type,
}

impl Value {
    /// An `int` constant.
    #[inline]
    pub fn const_int(value: i32) -> Self {
        Value {
            kind: ValueKind::ConstInt(value),
            ty: Type::Int,
        }
    }

    #[inline]
    pub(crate) fn local(id: LocalId, ty: Type) -> Self {
        Value {
            kind: ValueKind::Local(id),
            ty,
        }
    }

    #[inline]
    pub(crate) fn global(id: GlobalId, ty: Type) -> Self {
        Value {
            kind: ValueKind::Global(id),
            ty,
        }
    }

    #[inline]
    pub(crate) fn inst(id: InstId, ty: Type) -> Self {
        Value {
            kind: ValueKind::Inst(id),
            ty,
        }
    }

    #[inline]
    pub fn kind(self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn ty(self) -> Type {
        self.ty
    }

    /// Local and global slots can be the destination of a `Move`.
    #[inline]
    pub fn is_storage(self) -> bool {
        matches!(self.kind, ValueKind::Local(_) | ValueKind::Global(_))
    }

    /// The function owning this value, if it is function-scoped.
    pub fn owner(self) -> Option<FuncId> {
        match self.kind {
            ValueKind::Local(id) => Some(id.func()),
            ValueKind::Inst(id) => Some(id.func()),
            ValueKind::ConstInt(_) | ValueKind::Global(_) => None,
        }
    }

    pub fn as_local(self) -> Option<LocalId> {
        match self.kind {
            ValueKind::Local(id) => Some(id),
            _ => None,
        }
    }
}
