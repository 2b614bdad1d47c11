//! Statement parsing (spec §4.D, §3). `break`/`continue`/`for`/`while` and
//! the `del` deletion statement are left as explicit stubs (spec §9: "leave
//! these as clearly-marked stubs; do not guess grammar for them") — each
//! consumes its leading keyword, reports a diagnostic, and recovers, rather
//! than parsing invented grammar.

use super::{expr, is_decl_start, recover_to_next_decl, decl, State};
use crate::ast::{Ast, DeclSpaceId, Ranged, Stmt, StmtId};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::lex::TokenKind;

/// `'{' stmt* '}'`, allocating a fresh child declaration space for the block
/// (spec §8 invariant: `B.parentDeclSpace == N`).
pub fn parse_brace_block(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    parent_space: DeclSpaceId,
) -> StmtId {
    let open_range = match state.take_kind(&TokenKind::LBrace) {
        Some(t) => t.range,
        None => {
            sink.report(Diagnostic::error("expected '{'", state.error_range()));
            state.has_error = true;
            state.error_range()
        }
    };

    let space = ast.alloc_space(Some(parent_space));
    let mut stmts = Vec::new();
    loop {
        state.skip_while(|k| *k == TokenKind::Semi);
        if state.peek_kind() == Some(&TokenKind::RBrace) || state.peek().is_none() {
            break;
        }
        stmts.push(parse_stmt(state, ast, sink, space));
    }

    let close_range = match state.take_kind(&TokenKind::RBrace) {
        Some(t) => t.range,
        None => {
            sink.report(Diagnostic::error("expected '}'", state.error_range()));
            state.has_error = true;
            state.skip_while(|k| *k != TokenKind::RBrace && *k != TokenKind::Semi);
            state
                .take_kind(&TokenKind::RBrace)
                .map(|t| t.range)
                .unwrap_or_else(|| state.error_range())
        }
    };

    ast.alloc_stmt(Stmt::Block {
        space,
        stmts,
        range: open_range.join(&close_range),
    })
}

fn is_stmt_start(kind: &TokenKind) -> bool {
    is_decl_start(kind)
        || matches!(
            kind,
            TokenKind::Ret
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Del
                | TokenKind::LBrace
                | TokenKind::Match
        )
}

fn stub_stmt(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink, label: &str) -> StmtId {
    let tok = state.take().unwrap();
    sink.report(Diagnostic::error(
        format!("'{}' statements are not yet supported", label),
        tok.range,
    ));
    state.has_error = true;
    state.skip_while(|k| *k != TokenKind::Semi && *k != TokenKind::RBrace && !is_stmt_start(k));
    ast.alloc_stmt(Stmt::Error { range: tok.range })
}

pub fn parse_stmt(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
) -> StmtId {
    match state.peek_kind() {
        Some(TokenKind::Ret) => {
            let tok = state.take().unwrap();
            let value = if matches!(state.peek_kind(), Some(TokenKind::Semi) | Some(TokenKind::RBrace) | None)
            {
                None
            } else {
                Some(expr::parse_expr(state, ast, sink))
            };
            let range = match value {
                Some(v) => tok.range.join(&ast.expr(v).range()),
                None => tok.range,
            };
            ast.alloc_stmt(Stmt::Return { value, range })
        }
        Some(TokenKind::Break) => stub_stmt(state, ast, sink, "break"),
        Some(TokenKind::Continue) => stub_stmt(state, ast, sink, "continue"),
        Some(TokenKind::For) => stub_stmt(state, ast, sink, "for"),
        Some(TokenKind::While) => stub_stmt(state, ast, sink, "while"),
        Some(TokenKind::Del) => stub_stmt(state, ast, sink, "del"),
        Some(TokenKind::LBrace) => parse_brace_block(state, ast, sink, space),
        Some(TokenKind::Match) => {
            let match_expr = expr::parse_expr(state, ast, sink);
            let range = ast.expr(match_expr).range();
            ast.alloc_stmt(Stmt::MatchStmt { match_expr, range })
        }
        Some(kind) if is_decl_start(kind) => match decl::parse_decl(state, ast, sink, space) {
            Ok(id) => {
                let range = ast.decl(id).range();
                ast.alloc_stmt(Stmt::Decl { decl: id, range })
            }
            Err(err) => {
                sink.report(Diagnostic::error(err.message, err.range));
                state.has_error = true;
                recover_to_next_decl(state);
                ast.alloc_stmt(Stmt::Error { range: err.range })
            }
        },
        Some(_) => {
            let value = expr::parse_expr(state, ast, sink);
            let range = ast.expr(value).range();
            ast.alloc_stmt(Stmt::Expr { expr: value, range })
        }
        None => {
            let range = state.error_range();
            sink.report(Diagnostic::error("expected a statement", range));
            state.has_error = true;
            ast.alloc_stmt(Stmt::Error { range })
        }
    }
}
