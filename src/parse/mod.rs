//! Parser (component D, spec §4.D): token stream → AST, with error recovery
//! and precedence-climbing for infix expressions.

pub mod decl;
pub mod expr;
pub mod infix_tree;
pub mod pattern;
pub mod sign;
pub mod state;
pub mod stmt;

pub use state::{Flags, PResult, ParseError, State};

use crate::ast::{Ast, DeclSpaceId, Ranged};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::lex::{Lexer, TokenKind, TraceLevel};
use crate::source::{FileId, SourceManager, SourceRange};

/// Configuration threaded into `Parser::new` (spec's ambient "no file-based
/// config" decision — just a plain struct a library caller constructs).
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserConfig {
    pub trace: TraceLevel,
}

/// The result of parsing one source file: the populated AST, the root
/// declaration space the top-level decls were allocated into, and whether
/// any error (lex, parse, or semantic) was encountered (spec §4.D, §7).
pub struct ParsedUnit {
    pub ast: Ast,
    pub root: DeclSpaceId,
    pub has_error: bool,
}

/// Parse one source file into a `ParsedUnit`, reporting diagnostics to
/// `sink` in source order (spec §5 ordering guarantee; speculative sections
/// are buffered and replayed/discarded internally by the productions that
/// need it).
pub fn parse_source_unit(
    sources: &SourceManager,
    file: FileId,
    config: ParserConfig,
    sink: &mut dyn DiagnosticSink,
) -> ParsedUnit {
    let mut ast = Ast::new();
    let root = ast.alloc_root_space();
    let lexer = Lexer::new(file, sources.text(file));
    let eof = sources.eof_range(file);
    let mut state = State::new(lexer, root, eof);
    state.set_trace(config.trace);
    state.flags.parsing_top_level = true;

    parse_top_level(&mut state, &mut ast, sink);

    ParsedUnit {
        ast,
        root,
        has_error: state.has_error,
    }
}

/// Top level (spec §4.D): skip `;`; parse a `decl`; on `ParseError`, emit
/// the diagnostic, set `hasError`, then skip tokens until a `;`, `}`, or a
/// token that can begin another decl.
fn parse_top_level(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) {
    loop {
        state.skip_while(|k| *k == TokenKind::Semi);
        if state.peek().is_none() {
            break;
        }
        match decl::parse_decl(state, ast, sink, state.space) {
            Ok(id) => {
                let space = state.space;
                if !ast.space(space).decls.contains(&id) {
                    ast.space_mut(space).decls.push(id);
                }
            }
            Err(err) => {
                sink.report(Diagnostic::error(err.message, err.range));
                state.has_error = true;
                let before = state.peek().cloned();
                recover_to_next_decl(state);
                // A stray closing brace with no enclosing body stops
                // `recover_to_next_decl` without consuming anything (it's
                // deliberately left for an *enclosing* body to consume); at
                // the top level nothing else will ever consume it, so force
                // one token of progress to avoid looping forever on it.
                if state.peek().cloned() == before {
                    state.take();
                }
            }
        }
    }
}

/// Skip tokens until one that can plausibly begin another declaration, or a
/// `;`/`}` boundary (spec §4.D top-level recovery).
pub(crate) fn recover_to_next_decl(state: &mut State) {
    state.skip_while(|k| !is_decl_start(k) && *k != TokenKind::Semi && *k != TokenKind::RBrace);
}

pub(crate) fn is_decl_start(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Pub
            | TokenKind::Mod
            | TokenKind::Mut
            | TokenKind::Infix
            | TokenKind::Prefix
            | TokenKind::Postfix
            | TokenKind::Volatile
            | TokenKind::Static
            | TokenKind::Moveonly
            | TokenKind::Val
            | TokenKind::Var
            | TokenKind::Fun
            | TokenKind::New
            | TokenKind::Del
            | TokenKind::Type
            | TokenKind::View
            | TokenKind::Extn
    )
}

pub(crate) fn name_text(kind: &TokenKind) -> Option<String> {
    match kind {
        TokenKind::Name(text) => Some(text.clone()),
        _ => None,
    }
}

pub(crate) fn take_oper(state: &mut State, text: &str) -> Option<crate::lex::Token> {
    state.take_if(|k| matches!(k, TokenKind::Oper(t) if t == text))
}

pub(crate) fn take_name(state: &mut State) -> Option<(String, SourceRange)> {
    state
        .take_if(|k| matches!(k, TokenKind::Name(_)))
        .map(|tok| (name_text(&tok.kind).unwrap(), tok.range))
}

/// Lists (spec §4.D "Lists"): left delim, comma-separated items until one
/// `parse_item` call returns `None`, then right delim. Missing right delim:
/// recover by skipping to the next `close`, `}`, or `;`, then try once more
/// to take `close`.
pub(crate) fn parse_list<T>(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    open: TokenKind,
    close: TokenKind,
    mut parse_item: impl FnMut(&mut State, &mut Ast, &mut dyn DiagnosticSink) -> Option<T>,
) -> (Vec<T>, SourceRange) {
    let open_range = match state.take_kind(&open) {
        Some(t) => t.range,
        None => {
            sink.report(Diagnostic::error(
                format!("expected '{}'", open),
                state.error_range(),
            ));
            state.has_error = true;
            state.error_range()
        }
    };

    let mut items = Vec::new();
    if state.peek_kind() != Some(&close) {
        loop {
            match parse_item(state, ast, sink) {
                Some(item) => items.push(item),
                None => break,
            }
            if state.take_kind(&TokenKind::Comma).is_none() {
                break;
            }
        }
    }

    let close_range = match state.take_kind(&close) {
        Some(t) => t.range,
        None => {
            sink.report(Diagnostic::error(
                format!("expected '{}'", close),
                state.error_range(),
            ));
            state.has_error = true;
            state.skip_while(|k| *k != close && *k != TokenKind::RBrace && *k != TokenKind::Semi);
            match state.take_kind(&close) {
                Some(t) => t.range,
                None => state.error_range(),
            }
        }
    };

    (items, open_range.join(&close_range))
}
