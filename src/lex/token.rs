//! Token kinds (spec §3).

use crate::source::SourceRange;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers
    Name(String),

    // Keywords
    Val,
    Var,
    Fun,
    New,
    Del,
    Type,
    View,
    Extn,
    If,
    Match,
    Case,
    Where,
    Ret,
    Break,
    Continue,
    Async,
    Await,
    For,
    While,
    Pub,
    Mod,
    Mut,
    Infix,
    Prefix,
    Postfix,
    Volatile,
    Static,
    Moveonly,
    Cast,

    // Literals
    Int(String, IntRadix),
    Float(String),
    Bool(bool),
    Str(String),

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    LAngle,
    RAngle,
    Comma,
    Semi,
    Colon,
    TwoColons,
    Dot,
    Arrow,
    Assign,
    Under,

    /// A generic infix/prefix/postfix operator, lexed as a maximal run of
    /// operator-symbol characters. Its exact set of "weight"/associativity
    /// semantics is resolved later, by the parser's operator-group table.
    Oper(String),

    /// An unrecognized byte. Never halts lexing (spec §4.B); the lexer just
    /// emits this and moves one byte forward.
    Error(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRadix {
    Decimal,
    Hex,
    Octal,
    Binary,
}

impl TokenKind {
    /// The keyword this exact identifier text denotes, if any.
    pub fn keyword_for(text: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match text {
            "val" => Val,
            "var" => Var,
            "fun" => Fun,
            "new" => New,
            "del" => Del,
            "type" => Type,
            "view" => View,
            "extn" => Extn,
            "if" => If,
            "match" => Match,
            "case" => Case,
            "where" => Where,
            "ret" => Ret,
            "break" => Break,
            "continue" => Continue,
            "async" => Async,
            "await" => Await,
            "for" => For,
            "while" => While,
            "pub" => Pub,
            "mod" => Mod,
            "mut" => Mut,
            "infix" => Infix,
            "prefix" => Prefix,
            "postfix" => Postfix,
            "volatile" => Volatile,
            "static" => Static,
            "moveonly" => Moveonly,
            "cast" => Cast,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            TokenKind::Name(_)
                | TokenKind::Int(..)
                | TokenKind::Float(_)
                | TokenKind::Bool(_)
                | TokenKind::Str(_)
                | TokenKind::Error(_)
                | TokenKind::Oper(_)
        ) && !self.is_punctuation()
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LBrack
                | TokenKind::RBrack
                | TokenKind::LAngle
                | TokenKind::RAngle
                | TokenKind::Comma
                | TokenKind::Semi
                | TokenKind::Colon
                | TokenKind::TwoColons
                | TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::Assign
                | TokenKind::Under
        )
    }

    /// The literal text an operator-like token covers, used by the parser's
    /// `takeOperator` to check textual contiguity between e.g. `lAngle` and
    /// an adjacent `oper`.
    pub fn operator_text(&self) -> Option<&str> {
        match self {
            TokenKind::LAngle => Some("<"),
            TokenKind::RAngle => Some(">"),
            TokenKind::Assign => Some("="),
            TokenKind::Oper(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Name(text) => write!(f, "{}", text),
            TokenKind::Int(text, _) => write!(f, "{}", text),
            TokenKind::Float(text) => write!(f, "{}", text),
            TokenKind::Bool(value) => write!(f, "{}", value),
            TokenKind::Str(text) => write!(f, "{:?}", text),
            TokenKind::Oper(text) => write!(f, "{}", text),
            TokenKind::Error(ch) => write!(f, "<unknown byte {:?}>", ch),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBrace => write!(f, "{{"),
            TokenKind::RBrace => write!(f, "}}"),
            TokenKind::LBrack => write!(f, "["),
            TokenKind::RBrack => write!(f, "]"),
            TokenKind::LAngle => write!(f, "<"),
            TokenKind::RAngle => write!(f, ">"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semi => write!(f, ";"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::TwoColons => write!(f, "::"),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Under => write!(f, "_"),
            other => write!(f, "{}", format!("{:?}", other).to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: SourceRange,
    /// Whether a line break was skipped between the previous token and this
    /// one. Drives the parser's same-line rules for call arguments and
    /// identifier-as-infix (spec §4.D steps 2–3).
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, range: SourceRange, newline_before: bool) -> Self {
        Self {
            kind,
            range,
            newline_before,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.kind, self.range)
    }
}
