//! Recursive-descent parser producing the MiniC [`Ast`].
//!
//! Precedence, lowest first:
//!
//! | Level | Operators | Assoc |
//! |---|---|---|
//! | assignment | `=` | right |
//! | logical or | `\|\|` | left |
//! | logical and | `&&` | left |
//! | equality | `==` `!=` | left |
//! | relational | `<` `<=` `>` `>=` | left |
//! | additive | `+` `-` | left |
//! | multiplicative | `*` `/` `%` | left |
//! | unary | `-` `!` | prefix |
//!
//! Parsing stops at the first syntax error.

use minic_diagnostic::{
    unexpected_token, Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed,
};
use minic_ir::ast::{Ast, NodeId, NodeKind};
use minic_ir::Type;
use minic_stack::ensure_sufficient_stack;

use crate::lexer::{Token, TokenKind};

type PResult<T> = Result<T, ErrorGuaranteed>;

pub(crate) struct Parser<'q> {
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    queue: &'q mut DiagnosticQueue,
}

impl<'q> Parser<'q> {
    /// `tokens` must end with `Eof`.
    pub(crate) fn new(tokens: Vec<Token>, queue: &'q mut DiagnosticQueue) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Parser {
            tokens,
            pos: 0,
            ast: Ast::new(),
            queue,
        }
    }

    pub(crate) fn into_ast(self) -> Ast {
        self.ast
    }

    // Cursor

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn bump(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    #[cold]
    fn unexpected(&mut self, expected: &str) -> ErrorGuaranteed {
        let found = self.peek().to_string();
        let line = self.line();
        self.queue.emit(unexpected_token(line, expected, &found))
    }

    #[cold]
    fn error(&mut self, code: ErrorCode, message: String) -> ErrorGuaranteed {
        let line = self.line();
        self.queue
            .emit(Diagnostic::error(code).with_message(message).at_line(line))
    }

    fn ident(&mut self) -> PResult<NodeId> {
        let line = self.line();
        if let TokenKind::Ident(name) = self.peek() {
            let name = name.clone();
            self.bump();
            Ok(self.ast.leaf(NodeKind::Ident(name), line))
        } else {
            let found = self.peek().to_string();
            Err(self.error(
                ErrorCode::E1003,
                format!("expected identifier, found {found}"),
            ))
        }
    }

    fn is_type_start(&self) -> bool {
        matches!(self.peek(), TokenKind::Int | TokenKind::Void)
    }

    fn type_keyword(&mut self) -> PResult<Type> {
        let ty = match self.peek() {
            TokenKind::Int => Type::Int,
            TokenKind::Void => Type::Void,
            _ => return Err(self.unexpected("a type")),
        };
        self.bump();
        Ok(ty)
    }

    fn basic_type(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let ty = self.type_keyword()?;
        Ok(self.ast.leaf(NodeKind::Type(ty), line))
    }

    // Items

    /// `compileUnit: (funcDef | varDecl)* EOF`
    pub(crate) fn compile_unit(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let mut items = Vec::new();
        while *self.peek() != TokenKind::Eof {
            if !self.is_type_start() {
                return Err(self.unexpected("a function or variable declaration"));
            }
            let item = if *self.peek_nth(2) == TokenKind::LParen {
                self.func_def()?
            } else {
                self.var_decl()?
            };
            items.push(item);
        }
        Ok(self.ast.push(NodeKind::CompileUnit, items, line))
    }

    /// `funcDef: type ID '(' formalParams? ')' block`
    fn func_def(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let ty = self.basic_type()?;
        let name = self.ident()?;
        let params_line = self.line();
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if *self.peek() != TokenKind::RParen {
            loop {
                let param_line = self.line();
                let param_ty = self.basic_type()?;
                let param_name = self.ident()?;
                params.push(self.ast.push(
                    NodeKind::FormalParam,
                    [param_ty, param_name],
                    param_line,
                ));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let params = self.ast.push(NodeKind::FormalParams, params, params_line);
        let body = self.block()?;
        Ok(self.ast.push(NodeKind::FuncDef, [ty, name, params, body], line))
    }

    /// `varDecl: type ID (',' ID)* ';'`
    ///
    /// Each declared name gets its own `VarDecl` with its own type leaf.
    fn var_decl(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let ty = self.type_keyword()?;
        let mut decls = Vec::new();
        loop {
            let decl_line = self.line();
            let ty_node = self.ast.leaf(NodeKind::Type(ty), line);
            let name = self.ident()?;
            decls.push(self.ast.push(NodeKind::VarDecl, [ty_node, name], decl_line));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Semicolon)?;
        Ok(self.ast.push(NodeKind::DeclStmt, decls, line))
    }

    // Statements

    /// `block: '{' (varDecl | statement)* '}'`
    fn block(&mut self) -> PResult<NodeId> {
        let line = self.line();
        self.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            if self.is_type_start() {
                items.push(self.var_decl()?);
            } else if let Some(stmt) = self.statement()? {
                items.push(stmt);
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(self
            .ast
            .push(NodeKind::Block { needs_scope: true }, items, line))
    }

    /// A statement, or `None` for the empty statement `;`.
    fn statement(&mut self) -> PResult<Option<NodeId>> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Option<NodeId>> {
        let line = self.line();
        let node = match self.peek() {
            TokenKind::Semicolon => {
                self.bump();
                return Ok(None);
            }
            TokenKind::LBrace => self.block()?,
            TokenKind::Return => {
                self.bump();
                let mut children = Vec::new();
                if *self.peek() != TokenKind::Semicolon {
                    children.push(self.expr()?);
                }
                self.expect(&TokenKind::Semicolon)?;
                self.ast.push(NodeKind::Return, children, line)
            }
            TokenKind::Break | TokenKind::Continue => {
                let kind = if self.bump() == TokenKind::Break {
                    NodeKind::Break
                } else {
                    NodeKind::Continue
                };
                self.expect(&TokenKind::Semicolon)?;
                self.ast.leaf(kind, line)
            }
            TokenKind::If => {
                self.bump();
                let cond = self.paren_expr()?;
                let then = self.sub_statement()?;
                if self.eat(&TokenKind::Else) {
                    let otherwise = self.sub_statement()?;
                    self.ast.push(NodeKind::IfElse, [cond, then, otherwise], line)
                } else {
                    self.ast.push(NodeKind::If, [cond, then], line)
                }
            }
            TokenKind::While => {
                self.bump();
                let cond = self.paren_expr()?;
                let body = self.sub_statement()?;
                self.ast.push(NodeKind::While, [cond, body], line)
            }
            _ => {
                let expr = self.expr()?;
                self.expect(&TokenKind::Semicolon)?;
                expr
            }
        };
        Ok(Some(node))
    }

    /// Body of `if`/`else`/`while`. An empty statement becomes an empty block.
    fn sub_statement(&mut self) -> PResult<NodeId> {
        let line = self.line();
        match self.statement()? {
            Some(stmt) => Ok(stmt),
            None => Ok(self.ast.push(
                NodeKind::Block { needs_scope: false },
                std::iter::empty(),
                line,
            )),
        }
    }

    fn paren_expr(&mut self) -> PResult<NodeId> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    // Expressions

    /// Every nesting construct (parentheses, call arguments, right-hand
    /// sides) comes back through here.
    fn expr(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| self.assignment())
    }

    /// `lVal '=' expr`, right associative.
    fn assignment(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let lhs = self.logical_or()?;
        if *self.peek() != TokenKind::Assign {
            return Ok(lhs);
        }
        if !matches!(self.ast.kind(lhs), NodeKind::Ident(_)) {
            let what = self.ast.kind(lhs).name();
            return Err(self.error(
                ErrorCode::E1004,
                format!("cannot assign to {what}; only variables can be assigned"),
            ));
        }
        self.bump();
        let rhs = self.assignment()?;
        Ok(self.ast.push(NodeKind::Assign, [lhs, rhs], line))
    }

    fn logical_or(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::logical_and, |t| match t {
            TokenKind::OrOr => Some(NodeKind::Or),
            _ => None,
        })
    }

    fn logical_and(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::equality, |t| match t {
            TokenKind::AndAnd => Some(NodeKind::And),
            _ => None,
        })
    }

    fn equality(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::relational, |t| match t {
            TokenKind::EqEq => Some(NodeKind::Eq),
            TokenKind::NotEq => Some(NodeKind::Ne),
            _ => None,
        })
    }

    fn relational(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::additive, |t| match t {
            TokenKind::Lt => Some(NodeKind::Lt),
            TokenKind::LtEq => Some(NodeKind::Le),
            TokenKind::Gt => Some(NodeKind::Gt),
            TokenKind::GtEq => Some(NodeKind::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::multiplicative, |t| match t {
            TokenKind::Plus => Some(NodeKind::Add),
            TokenKind::Minus => Some(NodeKind::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> PResult<NodeId> {
        self.binary_level(Self::unary, |t| match t {
            TokenKind::Star => Some(NodeKind::Mul),
            TokenKind::Slash => Some(NodeKind::Div),
            TokenKind::Percent => Some(NodeKind::Mod),
            _ => None,
        })
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> PResult<NodeId>,
        op: fn(&TokenKind) -> Option<NodeKind>,
    ) -> PResult<NodeId> {
        let mut lhs = next(self)?;
        while let Some(kind) = op(self.peek()) {
            let line = self.line();
            self.bump();
            let rhs = next(self)?;
            lhs = self.ast.push(kind, [lhs, rhs], line);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<NodeId> {
        ensure_sufficient_stack(|| self.unary_inner())
    }

    fn unary_inner(&mut self) -> PResult<NodeId> {
        let line = self.line();
        let kind = match self.peek() {
            TokenKind::Minus => NodeKind::Neg,
            TokenKind::Bang => NodeKind::Not,
            _ => return self.primary(),
        };
        self.bump();
        let operand = self.unary()?;
        Ok(self.ast.push(kind, [operand], line))
    }

    /// `INT | ID | ID '(' args? ')' | '(' expr ')'`
    fn primary(&mut self) -> PResult<NodeId> {
        let line = self.line();
        match self.peek() {
            TokenKind::IntLit(n) => {
                let n = *n;
                self.bump();
                Ok(self.ast.leaf(NodeKind::IntLiteral(n), line))
            }
            TokenKind::Ident(_) => {
                let name = self.ident()?;
                if *self.peek() == TokenKind::LParen {
                    self.call(name, line)
                } else {
                    Ok(name)
                }
            }
            TokenKind::LParen => self.paren_expr(),
            _ => {
                let found = self.peek().to_string();
                Err(self.error(
                    ErrorCode::E1002,
                    format!("expected expression, found {found}"),
                ))
            }
        }
    }

    fn call(&mut self, callee: NodeId, line: u32) -> PResult<NodeId> {
        let args_line = self.line();
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if *self.peek() != TokenKind::RParen {
            loop {
                args.push(self.expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let args = self.ast.push(NodeKind::RealParams, args, args_line);
        Ok(self.ast.push(NodeKind::FuncCall, [callee, args], line))
    }
}

#[cfg(test)]
mod tests;
