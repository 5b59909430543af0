//! Arena syntax tree consumed by the IR generator.
//!
//! Nodes are stored flat in an [`Ast`] and refer to their children by
//! [`NodeId`]. Literal payloads (integer values, identifiers, declared types,
//! the block scope flag) live on the [`NodeKind`] itself. The tree is read
//! only once built.

use smallvec::SmallVec;

use crate::ids::next_raw;
use crate::Type;

/// Index of a node in an [`Ast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node kinds and their child layouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Items: `FuncDef` and `DeclStmt`.
    CompileUnit,
    /// `Type`, `Ident(name)`, `FormalParams`, `Block`.
    FuncDef,
    /// `FormalParam`*.
    FormalParams,
    /// `Type`, `Ident`.
    FormalParam,
    /// Statements; a new scope frame is pushed when `needs_scope` is set.
    Block { needs_scope: bool },
    /// `VarDecl`+.
    DeclStmt,
    /// `Type`, `Ident`.
    VarDecl,
    /// Target, value.
    Assign,
    /// Optional value.
    Return,
    /// Cond, then.
    If,
    /// Cond, then, else.
    IfElse,
    /// Cond, body.
    While,
    Break,
    Continue,
    /// `Ident(callee)`, `RealParams`.
    FuncCall,
    /// Argument expressions.
    RealParams,

    // Binary: lhs, rhs
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
    And,
    Or,

    // Unary: operand
    Neg,
    Not,

    // Leaves
    IntLiteral(u32),
    Ident(String),
    Type(Type),
}

impl NodeKind {
    /// Short human-readable name, used in diagnostics and traces.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::CompileUnit => "compile unit",
            NodeKind::FuncDef => "function definition",
            NodeKind::FormalParams => "parameter list",
            NodeKind::FormalParam => "parameter",
            NodeKind::Block { .. } => "block",
            NodeKind::DeclStmt => "declaration",
            NodeKind::VarDecl => "variable declaration",
            NodeKind::Assign => "assignment",
            NodeKind::Return => "return",
            NodeKind::If => "if",
            NodeKind::IfElse => "if-else",
            NodeKind::While => "while",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::FuncCall => "call",
            NodeKind::RealParams => "argument list",
            NodeKind::Add => "`+`",
            NodeKind::Sub => "`-`",
            NodeKind::Mul => "`*`",
            NodeKind::Div => "`/`",
            NodeKind::Mod => "`%`",
            NodeKind::Eq => "`==`",
            NodeKind::Ne => "`!=`",
            NodeKind::Lt => "`<`",
            NodeKind::Le => "`<=`",
            NodeKind::Gt => "`>`",
            NodeKind::Ge => "`>=`",
            NodeKind::And => "`&&`",
            NodeKind::Or => "`||`",
            NodeKind::Neg => "unary `-`",
            NodeKind::Not => "`!`",
            NodeKind::IntLiteral(_) => "integer literal",
            NodeKind::Ident(_) => "identifier",
            NodeKind::Type(_) => "type",
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            NodeKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<Type> {
        match self {
            NodeKind::Type(ty) => Some(*ty),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: SmallVec<[NodeId; 4]>,
    /// 1-based source line; 0 when unknown.
    pub line: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn new() -> Self {
        Ast { nodes: Vec::new() }
    }

    /// Add a node. Children must already be in the arena.
    pub fn push(
        &mut self,
        kind: NodeKind,
        children: impl IntoIterator<Item = NodeId>,
        line: u32,
    ) -> NodeId {
        let id = NodeId::new(next_raw(self.nodes.len()));
        let children: SmallVec<[NodeId; 4]> = children.into_iter().collect();
        debug_assert!(
            children.iter().all(|c| c.index() < self.nodes.len()),
            "child pushed after parent"
        );
        self.nodes.push(AstNode {
            kind,
            children,
            line,
        });
        id
    }

    /// Add a node without children.
    pub fn leaf(&mut self, kind: NodeKind, line: u32) -> NodeId {
        self.push(kind, std::iter::empty(), line)
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    /// # Panics
    ///
    /// Panics if `id` is not a node of this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The `n`th child, if present.
    #[inline]
    pub fn child(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.node(id).children.get(n).copied()
    }

    #[inline]
    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
