//! Index newtypes for module- and function-level arenas.

use std::fmt;

/// Function ID within a [`Module`](crate::Module).
///
/// Allocated sequentially in definition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FuncId(u32);

/// Global variable ID within a [`Module`](crate::Module).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct GlobalId(u32);

macro_rules! module_id {
    ($name:ident) => {
        impl $name {
            /// Create a new ID from a raw index.
            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

module_id!(FuncId);
module_id!(GlobalId);

// ── Function-scoped handles ─────────────────────────────────────────

/// Local storage slot: a named variable, a parameter or an anonymous
/// temporary of one function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId {
    func: FuncId,
    raw: u32,
}

/// Instruction handle into a function's instruction arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId {
    func: FuncId,
    raw: u32,
}

/// Label handle within one function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId {
    func: FuncId,
    raw: u32,
}

macro_rules! func_scoped_id {
    ($name:ident) => {
        impl $name {
            /// Create a handle from its owning function and a raw index.
            #[inline]
            pub fn new(func: FuncId, raw: u32) -> Self {
                Self { func, raw }
            }

            /// The function whose arena this handle points into.
            #[inline]
            pub fn func(self) -> FuncId {
                self.func
            }

            /// Get the raw `u32` value.
            #[inline]
            pub fn raw(self) -> u32 {
                self.raw
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub fn index(self) -> usize {
                self.raw as usize
            }
        }
    };
}

func_scoped_id!(LocalId);
func_scoped_id!(InstId);
func_scoped_id!(LabelId);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%l{}", self.raw)
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%t{}", self.raw)
    }
}

/// Converts an arena length into the next raw handle index.
#[inline]
pub(crate) fn next_raw(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
