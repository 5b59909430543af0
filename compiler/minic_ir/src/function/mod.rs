//! A function under construction: instruction arena, code list, locals and
//! labels.
//!
//! Builder methods (`binary`, `mov`, `goto`, ...) validate their operands and
//! allocate the instruction in the arena, returning its [`InstId`]. They do
//! not emit it. The generator collects handles into sequences and commits
//! them with [`Function::append`], so the code list only ever grows.

use smallvec::SmallVec;

use crate::ids::next_raw;
use crate::{BinaryOp, FuncId, InstId, Instr, IrError, LabelId, LocalId, Type, Value, ValueKind};

/// A local storage slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalInfo {
    /// Source name; `None` for temporaries and the return slot.
    pub name: Option<String>,
    pub ty: Type,
    pub is_param: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelInfo {
    pub name: String,
    pub placed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    id: FuncId,
    name: String,
    return_type: Type,
    params: Vec<LocalId>,
    locals: Vec<LocalInfo>,
    insts: Vec<Instr>,
    code: Vec<InstId>,
    labels: Vec<LabelInfo>,
    return_slot: Option<Value>,
    exit_label: Option<LabelId>,
    max_call_args: usize,
    has_call: bool,
}

impl Function {
    pub(crate) fn new(id: FuncId, name: String, return_type: Type) -> Self {
        Function {
            id,
            name,
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            insts: Vec::new(),
            code: Vec::new(),
            labels: Vec::new(),
            return_slot: None,
            exit_label: None,
            max_call_args: 0,
            has_call: false,
        }
    }

    // Accessors

    #[inline]
    pub fn id(&self) -> FuncId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn return_type(&self) -> Type {
        self.return_type
    }

    /// The emitted instruction stream, in order.
    #[inline]
    pub fn code(&self) -> &[InstId] {
        &self.code
    }

    /// Iterate the emitted instructions in order.
    pub fn instrs(&self) -> impl Iterator<Item = &Instr> + '_ {
        self.code.iter().map(|id| &self.insts[id.index()])
    }

    /// Look up an instruction of this function.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this function.
    pub fn inst(&self, id: InstId) -> &Instr {
        debug_assert_eq!(id.func(), self.id, "instruction handle from another function");
        &self.insts[id.index()]
    }

    /// Number of instructions allocated in the arena (emitted or not).
    #[inline]
    pub fn arena_len(&self) -> usize {
        self.insts.len()
    }

    #[inline]
    pub fn locals(&self) -> &[LocalInfo] {
        &self.locals
    }

    pub fn local(&self, id: LocalId) -> &LocalInfo {
        debug_assert_eq!(id.func(), self.id, "local handle from another function");
        &self.locals[id.index()]
    }

    #[inline]
    pub fn labels(&self) -> &[LabelInfo] {
        &self.labels
    }

    pub fn label(&self, id: LabelId) -> &LabelInfo {
        debug_assert_eq!(id.func(), self.id, "label handle from another function");
        &self.labels[id.index()]
    }

    /// Formal parameters in declaration order.
    #[inline]
    pub fn params(&self) -> &[LocalId] {
        &self.params
    }

    #[inline]
    pub fn return_slot(&self) -> Option<Value> {
        self.return_slot
    }

    #[inline]
    pub fn exit_label(&self) -> Option<LabelId> {
        self.exit_label
    }

    /// Largest argument count of any call emitted in the body.
    #[inline]
    pub fn max_call_args(&self) -> usize {
        self.max_call_args
    }

    #[inline]
    pub fn has_call(&self) -> bool {
        self.has_call
    }

    #[inline]
    pub fn value_type(&self, value: Value) -> Type {
        value.ty()
    }

    /// The value an instruction defines, or `None` if it defines nothing.
    pub fn inst_value(&self, id: InstId) -> Option<Value> {
        let ty = self.insts.get(id.index())?.result_type();
        if id.func() != self.id || ty.is_void() {
            return None;
        }
        Some(Value::inst(id, ty))
    }

    // Slots and labels

    pub(crate) fn new_local(&mut self, ty: Type, name: Option<&str>) -> Value {
        let id = LocalId::new(self.id, next_raw(self.locals.len()));
        self.locals.push(LocalInfo {
            name: name.map(str::to_owned),
            ty,
            is_param: false,
        });
        Value::local(id, ty)
    }

    pub(crate) fn new_param(&mut self, ty: Type, name: &str) -> Value {
        let id = LocalId::new(self.id, next_raw(self.locals.len()));
        self.locals.push(LocalInfo {
            name: Some(name.to_owned()),
            ty,
            is_param: true,
        });
        self.params.push(id);
        Value::local(id, ty)
    }

    /// Allocate a label. It must later be placed exactly once.
    pub fn new_label(&mut self, name: impl Into<String>) -> LabelId {
        let id = LabelId::new(self.id, next_raw(self.labels.len()));
        self.labels.push(LabelInfo {
            name: name.into(),
            placed: false,
        });
        id
    }

    /// Designate the slot `return` statements move their value into.
    pub fn set_return_slot(&mut self, slot: Value) -> Result<(), IrError> {
        let local = slot.as_local().ok_or(IrError::NotAssignable)?;
        self.check_local(local)?;
        self.return_slot = Some(slot);
        Ok(())
    }

    /// Designate the label every `return` jumps to.
    pub fn set_exit_label(&mut self, label: LabelId) -> Result<(), IrError> {
        self.check_label(label)?;
        self.exit_label = Some(label);
        Ok(())
    }

    // Instruction builders

    pub fn entry(&mut self) -> InstId {
        self.alloc(Instr::Entry)
    }

    pub fn exit(&mut self, value: Option<Value>) -> Result<InstId, IrError> {
        if let Some(v) = value {
            self.check_value(v, "exit")?;
        }
        Ok(self.alloc(Instr::Exit(value)))
    }

    /// Place `label`. Each label can be placed once.
    pub fn place_label(&mut self, label: LabelId) -> Result<InstId, IrError> {
        self.check_label(label)?;
        let info = &mut self.labels[label.index()];
        if info.placed {
            return Err(IrError::LabelAlreadyPlaced {
                name: info.name.clone(),
            });
        }
        info.placed = true;
        Ok(self.alloc(Instr::Label(label)))
    }

    pub fn goto(&mut self, target: LabelId) -> Result<InstId, IrError> {
        self.check_label(target)?;
        Ok(self.alloc(Instr::Goto(target)))
    }

    pub fn cond_br(
        &mut self,
        cond: Value,
        if_true: LabelId,
        if_false: LabelId,
    ) -> Result<InstId, IrError> {
        self.check_value(cond, "branch condition")?;
        self.check_label(if_true)?;
        self.check_label(if_false)?;
        Ok(self.alloc(Instr::CondBr {
            cond,
            if_true,
            if_false,
        }))
    }

    /// `dst = src`. `dst` must be a local or global slot.
    pub fn mov(&mut self, dst: Value, src: Value) -> Result<InstId, IrError> {
        if !dst.is_storage() {
            return Err(IrError::NotAssignable);
        }
        self.check_handle(dst)?;
        self.check_value(src, "assignment")?;
        Ok(self.alloc(Instr::Move { dst, src }))
    }

    /// `op lhs, rhs`; the result type follows from `op`.
    pub fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<InstId, IrError> {
        for operand in [lhs, rhs] {
            self.check_handle(operand)?;
            if !operand.ty().is_numeric() {
                return Err(IrError::NonNumericOperand {
                    op: op.as_str(),
                    found: operand.ty(),
                });
            }
        }
        Ok(self.alloc(Instr::Binary {
            op,
            lhs,
            rhs,
            ty: op.result_type(),
        }))
    }

    /// Call `callee` returning `ret_ty`. Records the call for frame sizing.
    pub fn call(
        &mut self,
        callee: FuncId,
        args: &[Value],
        ret_ty: Type,
    ) -> Result<InstId, IrError> {
        for &arg in args {
            self.check_value(arg, "call argument")?;
        }
        self.has_call = true;
        self.max_call_args = self.max_call_args.max(args.len());
        Ok(self.alloc(Instr::Call {
            callee,
            args: SmallVec::from_slice(args),
            ty: ret_ty,
        }))
    }

    /// Emit a sequence of previously built instructions, in order.
    pub fn append(&mut self, seq: &[InstId]) -> Result<(), IrError> {
        for &id in seq {
            if id.func() != self.id {
                return Err(IrError::ForeignReference {
                    what: "instruction",
                });
            }
            if id.index() >= self.insts.len() {
                return Err(IrError::UnknownHandle {
                    what: "instruction",
                });
            }
        }
        self.code.extend_from_slice(seq);
        Ok(())
    }

    // Validation

    fn alloc(&mut self, instr: Instr) -> InstId {
        let id = InstId::new(self.id, next_raw(self.insts.len()));
        self.insts.push(instr);
        id
    }

    fn check_value(&self, value: Value, context: &'static str) -> Result<(), IrError> {
        if value.ty().is_void() {
            return Err(IrError::VoidValue { context });
        }
        self.check_handle(value)
    }

    fn check_handle(&self, value: Value) -> Result<(), IrError> {
        match value.kind() {
            ValueKind::Local(id) => self.check_local(id),
            ValueKind::Inst(id) => {
                if id.func() != self.id {
                    return Err(IrError::ForeignReference {
                        what: "instruction",
                    });
                }
                if id.index() >= self.insts.len() {
                    return Err(IrError::UnknownHandle {
                        what: "instruction",
                    });
                }
                Ok(())
            }
            ValueKind::ConstInt(_) | ValueKind::Global(_) => Ok(()),
        }
    }

    fn check_local(&self, id: LocalId) -> Result<(), IrError> {
        if id.func() != self.id {
            return Err(IrError::ForeignReference { what: "variable" });
        }
        if id.index() >= self.locals.len() {
            return Err(IrError::UnknownHandle { what: "variable" });
        }
        Ok(())
    }

    fn check_label(&self, id: LabelId) -> Result<(), IrError> {
        if id.func() != self.id {
            return Err(IrError::ForeignReference { what: "label" });
        }
        if id.index() >= self.labels.len() {
            return Err(IrError::UnknownHandle { what: "label" });
        }
        Ok(())
    }
}
