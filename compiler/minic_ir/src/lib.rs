//! MiniC IR: the syntax tree vocabulary fed to the generator and the linear
//! instruction model it produces.
//!
//! # Layout
//!
//! - [`ast`]: arena syntax tree (`Ast`, `NodeId`, `NodeKind`)
//! - [`Value`] / [`Type`]: typed operands (constants, slots, instruction results)
//! - [`Instr`]: the fixed instruction set
//! - [`Function`]: per-function instruction arena plus the append-only code list
//! - [`Module`]: function table, globals and the scope-frame stack
//! - [`verify`]: structural checks over generated functions
//!
//! Handles (`LocalId`, `InstId`, `LabelId`) are plain indices into the arenas
//! owned by a [`Function`]. Each carries its owning [`FuncId`] so that a handle
//! from one function is never silently accepted by another.

pub mod ast;
mod function;
mod ids;
mod instr;
mod module;
mod print;
mod value;
pub mod verify;

pub use function::{Function, LabelInfo, LocalInfo};
pub use ids::{FuncId, GlobalId, InstId, LabelId, LocalId};
pub use instr::{BinaryOp, Instr, IrError};
pub use module::{GlobalInfo, Module, ScopeError};
pub use value::{Type, Value, ValueKind};
