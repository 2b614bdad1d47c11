//! `State` (spec §4.D): the parser's cheaply-clonable cursor. Carries the
//! lexer, a one-token lookahead, the current declaration-space parent, a
//! flag set, and a sticky `hasError` bit.

use crate::ast::DeclSpaceId;
use crate::lex::{Lexer, Token, TokenKind};
use crate::source::SourceRange;

/// The context flags a production may be parsed under. Saved/restored
/// alongside the rest of `State` so that entering a nested body (a function
/// or type's braces) and leaving it is just a save/mutate/restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub parsing_top_level: bool,
    pub parsing_prod_body: bool,
    pub parsing_view_body: bool,
    pub parsing_extn_body: bool,
    pub parsing_fun_body: bool,
    pub parsing_loop_body: bool,
}

/// Used exclusively for local backtracking within one production (spec §7);
/// never propagates out of the parser. Carries the diagnostic that should be
/// reported if the caller decides not to retry some alternative.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub range: SourceRange,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

pub type PResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone)]
pub struct State<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Token>,
    pub space: DeclSpaceId,
    pub flags: Flags,
    pub has_error: bool,
    eof: SourceRange,
}

impl<'src> State<'src> {
    pub fn new(mut lexer: Lexer<'src>, root_space: DeclSpaceId, eof: SourceRange) -> Self {
        let lookahead = lexer.next_token();
        Self {
            lexer,
            lookahead,
            space: root_space,
            flags: Flags::default(),
            has_error: false,
            eof,
        }
    }

    pub fn set_trace(&mut self, trace: crate::lex::TraceLevel) {
        self.lexer.set_trace(trace);
    }

    fn bump(&mut self) {
        self.lookahead = self.lexer.next_token();
    }

    pub fn peek(&self) -> Option<&Token> {
        self.lookahead.as_ref()
    }

    pub fn peek_kind(&self) -> Option<&TokenKind> {
        self.lookahead.as_ref().map(|t| &t.kind)
    }

    /// Unconditionally consume and return the current lookahead.
    pub fn take(&mut self) -> Option<Token> {
        let tok = self.lookahead.take();
        self.bump();
        tok
    }

    /// Consume the lookahead iff its kind satisfies `predicate`.
    pub fn take_if(&mut self, predicate: impl FnOnce(&TokenKind) -> bool) -> Option<Token> {
        if self.lookahead.as_ref().is_some_and(|t| predicate(&t.kind)) {
            self.take()
        } else {
            None
        }
    }

    /// Consume the lookahead iff it is exactly `kind`.
    pub fn take_kind(&mut self, kind: &TokenKind) -> Option<Token> {
        self.take_if(|k| k == kind)
    }

    pub fn skip_while(&mut self, mut predicate: impl FnMut(&TokenKind) -> bool) {
        while self.lookahead.as_ref().is_some_and(|t| predicate(&t.kind)) {
            self.take();
        }
    }

    /// The next token's range, or the file's EOF range if input is
    /// exhausted (spec §4.D `errorRange`).
    pub fn error_range(&self) -> SourceRange {
        self.lookahead.as_ref().map(|t| t.range).unwrap_or(self.eof)
    }

    pub fn save(&self) -> Self {
        self.clone()
    }

    pub fn restore(&mut self, saved: Self) {
        *self = saved;
    }

    /// `takeOperator`'s subtle contract (spec §4.D): a leading `lAngle`/
    /// `rAngle` may start an operator and is glued with the next token iff
    /// the two are textually contiguous (this token's end equals the next
    /// token's start). This is how `>>`, `<=`, etc. are lexed without
    /// ambiguity against generic brackets, which the lexer always emits as
    /// single-character tokens.
    pub fn take_operator(&mut self, including_assign: bool) -> Option<(String, SourceRange)> {
        let first_text = match self.peek_kind()? {
            TokenKind::Assign if !including_assign => return None,
            other => other.operator_text()?.to_string(),
        };
        let first = self.take().unwrap();
        let mut text = first_text;
        let mut last_range = first.range;

        loop {
            let glue = match self.peek() {
                Some(tok) if tok.range.start == last_range.end => match &tok.kind {
                    TokenKind::Assign if !including_assign => None,
                    other => other.operator_text().map(|s| s.to_string()),
                },
                _ => None,
            };
            match glue {
                Some(piece) => {
                    let tok = self.take().unwrap();
                    last_range = tok.range;
                    text.push_str(&piece);
                }
                None => break,
            }
        }

        Some((text, first.range.join(&last_range)))
    }

    pub fn peek_is_name(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Name(_)))
    }

    /// Whether the lookahead token starts on the same line the previous
    /// token ended on. Drives the same-line-as-LHS rule shared by call
    /// arguments and identifier-as-infix (spec §4.D steps 2–3).
    pub fn next_is_same_line(&self) -> bool {
        self.lookahead.as_ref().is_some_and(|t| !t.newline_before)
    }
}
