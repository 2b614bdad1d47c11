//! Lexer (component B): a single pass over one file's bytes, producing
//! tokens lazily. See spec §4.B.

mod cursor;
pub mod token;

pub use token::{IntRadix, Token, TokenKind};

use crate::source::{FileId, SourceRange};
use cursor::Cursor;

const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '%', '=', '!', '&', '|', '^', '~', '?'];

/// How verbosely the lexer narrates tokenization. Mirrors the teacher's
/// `Log<T>` ordering (`None < Default < Success < Result < Verbose`);
/// narration is `println!`-based and only active in debug builds, matching
/// the lightweight approach this crate's teacher uses instead of an
/// external logging crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    None,
    Default,
    Verbose,
}

impl Default for TraceLevel {
    fn default() -> Self {
        TraceLevel::None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Lexer<'src> {
    file: FileId,
    cursor: Cursor<'src>,
    trace: TraceLevel,
}

impl<'src> Lexer<'src> {
    pub fn new(file: FileId, text: &'src str) -> Self {
        Self {
            file,
            cursor: Cursor::new(text),
            trace: TraceLevel::None,
        }
    }

    pub fn set_trace(&mut self, trace: TraceLevel) {
        self.trace = trace;
    }

    fn range(&self, start: u32) -> SourceRange {
        SourceRange::new(self.file, start, self.cursor.pos)
    }

    fn skip_trivia(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            match self.cursor.peek() {
                Some(ch) if ch.is_whitespace() => {
                    if ch == '\n' {
                        saw_newline = true;
                    }
                    self.cursor.bump();
                }
                Some('/') if self.cursor.peek_at(1) == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.peek_at(1) == Some('*') => {
                    self.cursor.bump();
                    self.cursor.bump();
                    let mut depth = 1usize;
                    while depth > 0 {
                        match self.cursor.bump() {
                            Some('*') if self.cursor.peek() == Some('/') => {
                                self.cursor.bump();
                                depth -= 1;
                            }
                            Some('/') if self.cursor.peek() == Some('*') => {
                                self.cursor.bump();
                                depth += 1;
                            }
                            Some('\n') => saw_newline = true,
                            Some(_) => {}
                            None => break,
                        }
                    }
                }
                _ => break,
            }
        }
        saw_newline
    }

    /// Produce the next token, or `None` at end of input (spec §4.B).
    pub fn next_token(&mut self) -> Option<Token> {
        let newline_before = self.skip_trivia();
        let start = self.cursor.pos;
        let ch = self.cursor.peek()?;

        let kind = if is_ident_start(ch) {
            self.lex_ident_or_keyword()
        } else if ch.is_ascii_digit() {
            self.lex_number()
        } else if ch == '"' {
            self.lex_string()
        } else {
            self.lex_punct_or_operator()
        };

        let token = Token::new(kind, self.range(start), newline_before);
        if self.trace >= TraceLevel::Default {
            println!("[lex] {}", token);
        }
        Some(token)
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let start = self.cursor.pos;
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice_from(start);
        if text == "_" {
            return TokenKind::Under;
        }
        if text == "true" {
            return TokenKind::Bool(true);
        }
        if text == "false" {
            return TokenKind::Bool(false);
        }
        if let Some(keyword) = TokenKind::keyword_for(text) {
            return keyword;
        }
        TokenKind::Name(text.to_string())
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.cursor.pos;
        if self.cursor.peek() == Some('0') {
            let radix = match self.cursor.peek_at(1) {
                Some('x') | Some('X') => Some(IntRadix::Hex),
                Some('o') | Some('O') => Some(IntRadix::Octal),
                Some('b') | Some('B') => Some(IntRadix::Binary),
                _ => None,
            };
            if let Some(radix) = radix {
                self.cursor.bump(); // '0'
                self.cursor.bump(); // radix marker
                self.cursor
                    .eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                let text = self.cursor.slice_from(start).to_string();
                return TokenKind::Int(text, radix);
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        let mut is_float = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.cursor.bump();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            let mut lookahead = 1usize;
            if matches!(self.cursor.peek_at(1), Some('+') | Some('-')) {
                lookahead = 2;
            }
            if self.cursor.peek_at(lookahead).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..lookahead {
                    self.cursor.bump();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }

        let text = self.cursor.slice_from(start).to_string();
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text, IntRadix::Decimal)
        }
    }

    fn lex_string(&mut self) -> TokenKind {
        self.cursor.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.bump() {
                None | Some('"') => break,
                Some('\\') => match self.cursor.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    Some('u') => {
                        if self.cursor.peek() == Some('{') {
                            self.cursor.bump();
                            let hex_start = self.cursor.pos;
                            self.cursor.eat_while(|c| c != '}');
                            let hex = self.cursor.slice_from(hex_start);
                            if let Ok(code) = u32::from_str_radix(hex, 16) {
                                if let Some(decoded) = char::from_u32(code) {
                                    value.push(decoded);
                                }
                            }
                            if self.cursor.peek() == Some('}') {
                                self.cursor.bump();
                            }
                        }
                    }
                    Some(other) => value.push(other),
                    None => break,
                },
                Some(other) => value.push(other),
            }
        }
        TokenKind::Str(value)
    }

    fn lex_punct_or_operator(&mut self) -> TokenKind {
        let ch = self.cursor.bump().expect("checked by caller");
        match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBrack,
            ']' => TokenKind::RBrack,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            '.' => TokenKind::Dot,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            ':' => {
                if self.cursor.peek() == Some(':') {
                    self.cursor.bump();
                    TokenKind::TwoColons
                } else {
                    TokenKind::Colon
                }
            }
            '-' if self.cursor.peek() == Some('>') => {
                self.cursor.bump();
                TokenKind::Arrow
            }
            c if OPERATOR_CHARS.contains(&c) => {
                let start = self.cursor.pos - c.len_utf8() as u32;
                self.cursor.eat_while(|c| OPERATOR_CHARS.contains(&c));
                let text = self.cursor.slice_from(start);
                if text == "=" {
                    TokenKind::Assign
                } else {
                    TokenKind::Oper(text.to_string())
                }
            }
            other => TokenKind::Error(other),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceManager;

    fn tokens(text: &str) -> Vec<TokenKind> {
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", text);
        let mut lexer = Lexer::new(id, sm.text(id));
        let mut out = Vec::new();
        while let Some(tok) = lexer.next_token() {
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_a_single_string_literal() {
        let toks = tokens(r#""Salut""#);
        assert_eq!(toks, vec![TokenKind::Str("Salut".to_string())]);
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let toks = tokens("val x fun pub");
        assert_eq!(
            toks,
            vec![
                TokenKind::Val,
                TokenKind::Name("x".to_string()),
                TokenKind::Fun,
                TokenKind::Pub,
            ]
        );
    }

    #[test]
    fn lexes_bool_literals_not_as_identifiers() {
        let toks = tokens("true false");
        assert_eq!(toks, vec![TokenKind::Bool(true), TokenKind::Bool(false)]);
    }

    #[test]
    fn distinguishes_under_from_name() {
        let toks = tokens("_ _foo");
        assert_eq!(toks[0], TokenKind::Under);
        assert_eq!(toks[1], TokenKind::Name("_foo".to_string()));
    }

    #[test]
    fn glues_angle_brackets_separately_from_operators() {
        let toks = tokens("a<b>=c");
        assert_eq!(
            toks,
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::LAngle,
                TokenKind::Name("b".to_string()),
                TokenKind::RAngle,
                TokenKind::Assign,
                TokenKind::Name("c".to_string()),
            ]
        );
    }

    #[test]
    fn lexes_radix_integers() {
        let toks = tokens("0x1F 0b101 0o17 42");
        assert_eq!(
            toks,
            vec![
                TokenKind::Int("0x1F".to_string(), IntRadix::Hex),
                TokenKind::Int("0b101".to_string(), IntRadix::Binary),
                TokenKind::Int("0o17".to_string(), IntRadix::Octal),
                TokenKind::Int("42".to_string(), IntRadix::Decimal),
            ]
        );
    }

    #[test]
    fn lexes_float_literals() {
        let toks = tokens("3.14 2e10 1.5e-3");
        assert_eq!(
            toks,
            vec![
                TokenKind::Float("3.14".to_string()),
                TokenKind::Float("2e10".to_string()),
                TokenKind::Float("1.5e-3".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_byte_does_not_halt_lexing() {
        let toks = tokens("a`b");
        assert_eq!(
            toks,
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::Error('`'),
                TokenKind::Name("b".to_string()),
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let toks = tokens("a // comment\n/* block\n comment */ b");
        assert_eq!(
            toks,
            vec![
                TokenKind::Name("a".to_string()),
                TokenKind::Name("b".to_string()),
            ]
        );
    }

    #[test]
    fn reconstructs_non_whitespace_content() {
        let text = "val x: Int = 42 // trailing\n";
        let mut sm = SourceManager::new();
        let id = sm.load_synthesized("<test>", text);
        let mut lexer = Lexer::new(id, sm.text(id));
        let mut reconstructed = String::new();
        while let Some(tok) = lexer.next_token() {
            reconstructed.push_str(sm.range_text(tok.range));
        }
        let non_ws: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let non_ws = non_ws.replace("//trailing", "");
        let reconstructed_non_ws: String =
            reconstructed.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(reconstructed_non_ws, "valx:Int=42");
        let _ = non_ws;
    }
}
