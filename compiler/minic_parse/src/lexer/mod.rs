//! Lexer for MiniC using logos.
//!
//! Integer literals are decimal, octal (`017`) or hexadecimal (`0x1F`), all
//! unsigned 32-bit. `//` line comments and `/* */` block comments are
//! skipped. Every lexical error is reported; lexing continues past it so one
//! run surfaces all of them.

use std::fmt;

use logos::{Lexer, Logos};
use minic_diagnostic::{DiagnosticQueue, ErrorCode, ErrorGuaranteed};

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // Keywords
    #[token("int")]
    Int,
    #[token("void")]
    Void,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    // Operators
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // Integer literals
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| u32::from_str_radix(&lex.slice()[2..], 16).ok())]
    HexInt(u32),
    #[regex(r"0[0-7]+", |lex| u32::from_str_radix(&lex.slice()[1..], 8).ok())]
    OctInt(u32),
    #[regex(r"[1-9][0-9]*|0", |lex| lex.slice().parse::<u32>().ok())]
    DecInt(u32),
    /// `0x` without digits, or an octal literal containing 8 or 9.
    #[regex(r"0[xX]|0[0-9]*[89][0-9]*")]
    BadInt,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume a block comment body. Fails if `*/` never appears.
fn block_comment(lex: &mut Lexer<'_, RawToken>) -> bool {
    if let Some(end) = lex.remainder().find("*/") {
        lex.bump(end + 2);
        true
    } else {
        lex.bump(lex.remainder().len());
        false
    }
}

/// Token kinds seen by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Int,
    Void,
    If,
    Else,
    While,
    Break,
    Continue,
    Return,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    // Operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,

    // Literals
    IntLit(u32),
    Ident(String),

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Int => "int",
            TokenKind::Void => "void",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::IntLit(n) => return write!(f, "integer `{n}`"),
            TokenKind::Ident(name) => return write!(f, "identifier `{name}`"),
            TokenKind::Eof => return write!(f, "end of file"),
        };
        write!(f, "`{text}`")
    }
}

/// A token with the source line it starts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based.
    pub line: u32,
}

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { line_starts }
    }

    pub fn line_of(&self, offset: usize) -> u32 {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        u32::try_from(line).unwrap_or(u32::MAX)
    }
}

/// Lex `source`. Reports every lexical error and fails if there was any.
///
/// The returned list always ends with [`TokenKind::Eof`].
pub fn lex(source: &str, queue: &mut DiagnosticQueue) -> Result<Vec<Token>, ErrorGuaranteed> {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut failed = None;
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let line = lines.line_of(logos.span().start);
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::BadInt) => {
                failed = Some(queue.error(
                    ErrorCode::E0002,
                    line,
                    format!("invalid integer literal `{slice}`"),
                ));
            }
            Ok(raw) => {
                if let Some(kind) = convert_token(raw, slice) {
                    tokens.push(Token { kind, line });
                }
            }
            Err(()) => failed = Some(report_lex_error(queue, slice, line)),
        }
    }

    if let Some(guar) = failed {
        return Err(guar);
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        line: lines.line_of(source.len()),
    });
    Ok(tokens)
}

#[cold]
fn report_lex_error(queue: &mut DiagnosticQueue, slice: &str, line: u32) -> ErrorGuaranteed {
    if slice.starts_with("/*") {
        queue.error(ErrorCode::E0003, line, "unterminated block comment")
    } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
        queue.error(
            ErrorCode::E0002,
            line,
            format!("integer literal `{slice}` does not fit in 32 bits"),
        )
    } else {
        queue.error(
            ErrorCode::E0001,
            line,
            format!("invalid character `{}`", slice.escape_debug()),
        )
    }
}

/// The public token for `raw`, or `None` for comments and malformed
/// literals, which produce no token.
fn convert_token(raw: RawToken, slice: &str) -> Option<TokenKind> {
    let kind = match raw {
        RawToken::Int => TokenKind::Int,
        RawToken::Void => TokenKind::Void,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Return => TokenKind::Return,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::Bang => TokenKind::Bang,
        RawToken::HexInt(n) | RawToken::OctInt(n) | RawToken::DecInt(n) => TokenKind::IntLit(n),
        RawToken::Ident => TokenKind::Ident(slice.to_owned()),
        RawToken::LineComment | RawToken::BlockComment | RawToken::BadInt => return None,
    };
    Some(kind)
}
