//! Expression parsing (spec §4.D steps 1–4, "Declaration references",
//! "Match"): prefix-expr, compound-expr (postfix chain), binary suffixes
//! assembled through an `InfixTree`, and speculative qualified decl-refs.

use super::infix_tree::{CastKind, InfixTree, Suffix};
use super::{parse_list, sign, stmt, take_name, State};
use crate::ast::expr::{Argument, MatchCaseData, TupleElement, TupleIndex};
use crate::ast::{Ast, Decl, DeclSpaceId, Expr, ExprId, Modifiers, Pattern, Ranged, TypeSlot};
use crate::diagnostic::{BufferingSink, Diagnostic, DiagnosticSink};
use crate::lex::TokenKind;

pub fn parse_expr(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    let lhs = parse_operand(state, ast, sink);
    let mut tree = InfixTree::leaf(lhs);
    let mut prev_end = ast.expr(lhs).range().end;

    loop {
        if let Some((kind, target, range)) = try_take_cast_suffix(state, ast, sink) {
            tree = tree.append(Suffix::Cast(kind, target), range, lhs);
            prev_end = range.end;
            continue;
        }

        if let Some((text, op_range)) = state.take_operator(true) {
            let gap_before = op_range.start != prev_end;
            let gap_after = state
                .peek()
                .map(|t| t.range.start != op_range.end)
                .unwrap_or(true);
            if gap_before != gap_after {
                sink.report(Diagnostic::warning(
                    "inconsistent whitespace around infix operator",
                    op_range,
                ));
            }
            let rhs = parse_operand(state, ast, sink);
            prev_end = ast.expr(rhs).range().end;
            tree = tree.append(Suffix::Operator(text), op_range, rhs);
            continue;
        }

        if state.peek_is_name() && state.next_is_same_line() {
            let (text, range) = take_name(state).unwrap();
            let rhs = parse_operand(state, ast, sink);
            prev_end = ast.expr(rhs).range().end;
            tree = tree.append(Suffix::Identifier(text), range, rhs);
            continue;
        }

        break;
    }

    tree.flatten(ast)
}

/// `cast` is lexed as a bare keyword; `?`/`!` immediately following it (no
/// gap — they are ordinary `oper` runs) select dyn-cast vs. unsafe-cast.
fn try_take_cast_suffix(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> Option<(CastKind, crate::ast::SignId, crate::source::SourceRange)> {
    if state.peek_kind() != Some(&TokenKind::Cast) {
        return None;
    }
    let cast_tok = state.take().unwrap();
    let kind = match state.peek() {
        Some(tok) if tok.range.start == cast_tok.range.end => match &tok.kind {
            TokenKind::Oper(t) if t == "?" => {
                state.take();
                CastKind::Dyn
            }
            TokenKind::Oper(t) if t == "!" => {
                state.take();
                CastKind::Unsafe
            }
            _ => {
                sink.report(Diagnostic::error(
                    "expected '?' or '!' after 'cast'",
                    state.error_range(),
                ));
                state.has_error = true;
                CastKind::Unsafe
            }
        },
        _ => {
            sink.report(Diagnostic::error(
                "expected '?' or '!' after 'cast'",
                state.error_range(),
            ));
            state.has_error = true;
            CastKind::Unsafe
        }
    };
    let target = sign::parse_sign(state, ast, sink);
    let range = cast_tok.range.join(&ast.sign(target).range());
    Some((kind, target, range))
}

/// Step 1 + step 2: a (possibly stacked) prefix operator around an operand
/// that itself carries its full postfix chain.
fn parse_operand(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    if let Some((text, op_range)) = try_take_prefix(state) {
        let operand = parse_operand(state, ast, sink);
        let range = op_range.join(&ast.expr(operand).range());
        return if text == "&" {
            ast.alloc_expr(Expr::AddrOf {
                operand,
                ty: TypeSlot::unresolved(),
                range,
            })
        } else {
            ast.alloc_expr(Expr::PrefixCall {
                op: text,
                operand,
                ty: TypeSlot::unresolved(),
                range,
            })
        };
    }
    let base = parse_primary_expr(state, ast, sink);
    parse_compound_suffixes(state, ast, sink, base)
}

/// A prefix operator must sit immediately adjacent to its operand (no gap).
/// Never `=` (not an `oper` token) and never `cast` (a keyword, not an
/// `oper` token) — both are excluded structurally by only matching `Oper`.
fn try_take_prefix(state: &mut State) -> Option<(String, crate::source::SourceRange)> {
    let text = match state.peek_kind() {
        Some(TokenKind::Oper(text)) => text.clone(),
        _ => return None,
    };
    let saved = state.save();
    let tok = state.take().unwrap();
    let adjacent = state
        .peek()
        .map(|next| next.range.start == tok.range.end)
        .unwrap_or(false);
    if adjacent {
        Some((text, tok.range))
    } else {
        state.restore(saved);
        None
    }
}

fn parse_compound_suffixes(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    mut base: ExprId,
) -> ExprId {
    loop {
        match state.peek_kind() {
            Some(TokenKind::LParen) if state.next_is_same_line() => {
                let (args, range) = parse_call_args(state, ast, sink);
                let full = ast.expr(base).range().join(&range);
                base = ast.alloc_expr(Expr::Call {
                    callee: base,
                    args,
                    ty: TypeSlot::unresolved(),
                    range: full,
                });
            }
            Some(TokenKind::LBrack) if state.next_is_same_line() => {
                let (args, range) = parse_subscript_args(state, ast, sink);
                let member_range = ast.expr(base).range();
                let callee = ast.alloc_expr(Expr::Member {
                    base,
                    name: "[]".to_string(),
                    ty: TypeSlot::unresolved(),
                    range: member_range,
                });
                let full = member_range.join(&range);
                base = ast.alloc_expr(Expr::Call {
                    callee,
                    args,
                    ty: TypeSlot::unresolved(),
                    range: full,
                });
            }
            Some(TokenKind::Dot) => {
                let dot = state.take().unwrap();
                base = parse_member_access(state, ast, sink, base, dot.range);
            }
            Some(TokenKind::Oper(_)) => {
                let attached = state
                    .peek()
                    .map(|t| t.range.start == ast.expr(base).range().end)
                    .unwrap_or(false);
                if !attached {
                    break;
                }
                let saved = state.save();
                let tok = state.take().unwrap();
                let followed_by_gap_or_eof = match state.peek() {
                    None => true,
                    Some(next) => next.range.start != tok.range.end,
                };
                if followed_by_gap_or_eof {
                    let text = match &tok.kind {
                        TokenKind::Oper(t) => t.clone(),
                        _ => unreachable!("matched Oper above"),
                    };
                    let range = ast.expr(base).range().join(&tok.range);
                    base = ast.alloc_expr(Expr::PostfixCall {
                        op: text,
                        operand: base,
                        ty: TypeSlot::unresolved(),
                        range,
                    });
                } else {
                    state.restore(saved);
                    break;
                }
            }
            _ => break,
        }
    }
    base
}

fn parse_member_access(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    base: ExprId,
    dot_range: crate::source::SourceRange,
) -> ExprId {
    match state.peek_kind() {
        Some(TokenKind::Name(_)) => {
            let (name, range) = take_name(state).unwrap();
            let full = ast.expr(base).range().join(&range);
            ast.alloc_expr(Expr::Member {
                base,
                name,
                ty: TypeSlot::unresolved(),
                range: full,
            })
        }
        Some(TokenKind::Int(text, crate::lex::IntRadix::Decimal)) => {
            let text = text.clone();
            let tok = state.take().unwrap();
            let index = text.parse::<usize>().unwrap_or(0);
            let full = ast.expr(base).range().join(&tok.range);
            ast.alloc_expr(Expr::TupleMember {
                base,
                index: TupleIndex::Position(index),
                ty: TypeSlot::unresolved(),
                range: full,
            })
        }
        Some(TokenKind::Oper(_)) => {
            let tok = state.take().unwrap();
            let text = match &tok.kind {
                TokenKind::Oper(t) => t.clone(),
                _ => unreachable!("matched Oper above"),
            };
            let full = ast.expr(base).range().join(&tok.range);
            ast.alloc_expr(Expr::Member {
                base,
                name: text,
                ty: TypeSlot::unresolved(),
                range: full,
            })
        }
        _ => {
            sink.report(Diagnostic::error(
                "expected a member name after '.'",
                dot_range,
            ));
            state.has_error = true;
            ast.alloc_expr(Expr::Error { range: dot_range })
        }
    }
}

fn parse_call_args(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> (Vec<Argument>, crate::source::SourceRange) {
    parse_list(
        state,
        ast,
        sink,
        TokenKind::LParen,
        TokenKind::RParen,
        parse_argument,
    )
}

fn parse_subscript_args(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> (Vec<Argument>, crate::source::SourceRange) {
    parse_list(
        state,
        ast,
        sink,
        TokenKind::LBrack,
        TokenKind::RBrack,
        parse_argument,
    )
}

fn parse_argument(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> Option<Argument> {
    if state.peek().is_none() {
        return None;
    }
    let saved = state.save();
    if let Some((label, _)) = take_name(state) {
        if state.take_kind(&TokenKind::Colon).is_some() {
            let value = parse_expr(state, ast, sink);
            return Some(Argument {
                label: Some(label),
                value,
            });
        }
        state.restore(saved);
    }
    let value = parse_expr(state, ast, sink);
    Some(Argument { label: None, value })
}

fn parse_primary_expr(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    match state.peek_kind() {
        Some(TokenKind::Bool(_)) => {
            let tok = state.take().unwrap();
            let value = matches!(tok.kind, TokenKind::Bool(true));
            ast.alloc_expr(Expr::BoolLit {
                value,
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Int(..)) => {
            let tok = state.take().unwrap();
            let (text, radix) = match tok.kind {
                TokenKind::Int(text, radix) => (text, radix),
                _ => unreachable!(),
            };
            ast.alloc_expr(Expr::IntLit {
                text,
                radix,
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Float(_)) => {
            let tok = state.take().unwrap();
            let text = match tok.kind {
                TokenKind::Float(text) => text,
                _ => unreachable!(),
            };
            ast.alloc_expr(Expr::FloatLit {
                text,
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Str(_)) => {
            let tok = state.take().unwrap();
            let value = match tok.kind {
                TokenKind::Str(value) => value,
                _ => unreachable!(),
            };
            ast.alloc_expr(Expr::StringLit {
                value,
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Under) => {
            let tok = state.take().unwrap();
            ast.alloc_expr(Expr::Wildcard {
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Async) => {
            let tok = state.take().unwrap();
            let body = parse_operand(state, ast, sink);
            let range = tok.range.join(&ast.expr(body).range());
            ast.alloc_expr(Expr::Async {
                body,
                ty: TypeSlot::unresolved(),
                range,
            })
        }
        Some(TokenKind::Await) => {
            let tok = state.take().unwrap();
            let operand = parse_operand(state, ast, sink);
            let range = tok.range.join(&ast.expr(operand).range());
            ast.alloc_expr(Expr::Await {
                operand,
                ty: TypeSlot::unresolved(),
                range,
            })
        }
        Some(TokenKind::Match) => parse_match_expr(state, ast, sink),
        Some(TokenKind::LParen) => parse_tuple_or_group(state, ast, sink),
        Some(TokenKind::Name(name)) if name == "self" || name == "this" => {
            let tok = state.take().unwrap();
            ast.alloc_expr(Expr::Receiver {
                is_self: true,
                ty: TypeSlot::unresolved(),
                range: tok.range,
            })
        }
        Some(TokenKind::Name(_)) => parse_decl_ref_expr(state, ast, sink),
        _ => {
            let range = state.error_range();
            sink.report(Diagnostic::error("expected an expression", range));
            state.has_error = true;
            ast.alloc_expr(Expr::Error { range })
        }
    }
}

fn parse_tuple_or_group(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    let (elements, range) = parse_list(
        state,
        ast,
        sink,
        TokenKind::LParen,
        TokenKind::RParen,
        |state, ast, sink| {
            if state.peek_kind() == Some(&TokenKind::RParen) || state.peek().is_none() {
                return None;
            }
            let saved = state.save();
            if let Some((label, _)) = take_name(state) {
                if state.take_kind(&TokenKind::Colon).is_some() {
                    let value = parse_expr(state, ast, sink);
                    return Some(TupleElement {
                        label: Some(label),
                        value,
                    });
                }
                state.restore(saved);
            }
            let value = parse_expr(state, ast, sink);
            Some(TupleElement { label: None, value })
        },
    );

    if elements.len() == 1 && elements[0].label.is_none() {
        elements.into_iter().next().unwrap().value
    } else {
        ast.alloc_expr(Expr::Tuple {
            elements,
            ty: TypeSlot::unresolved(),
            range,
        })
    }
}

/// "Declaration references" (spec §4.D): speculatively parse a `::`-path;
/// diagnostics produced while doing so are buffered and only committed once
/// the path resolves to a real qualified reference. If it doesn't (a
/// trailing `::` with nothing after it), the buffered diagnostics AND the
/// consumed tokens are both discarded, falling back to the bare identifier.
fn parse_decl_ref_expr(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    let (first, first_range) = take_name(state).unwrap();
    if state.peek_kind() != Some(&TokenKind::TwoColons) {
        return ast.alloc_expr(Expr::UnresolvedDeclRef {
            namespace: None,
            name: first,
            ty: TypeSlot::unresolved(),
            range: first_range,
        });
    }

    let saved = state.save();
    let mut segments = vec![(first.clone(), first_range)];
    let mut ok = true;
    {
        let mut buffer = BufferingSink::new(sink);
        while state.take_kind(&TokenKind::TwoColons).is_some() {
            match take_name(state) {
                Some((name, range)) => segments.push((name, range)),
                None => {
                    buffer.report(Diagnostic::error(
                        "expected a name after '::'",
                        state.error_range(),
                    ));
                    ok = false;
                    break;
                }
            }
        }
        if ok && segments.len() > 1 {
            buffer.commit();
        } else {
            buffer.discard();
        }
    }

    if ok && segments.len() > 1 {
        let (name, name_range) = segments.pop().unwrap();
        let namespace = path_to_sign(ast, &segments);
        let range = first_range.join(&name_range);
        ast.alloc_expr(Expr::UnresolvedDeclRef {
            namespace: Some(namespace),
            name,
            ty: TypeSlot::unresolved(),
            range,
        })
    } else {
        state.restore(saved);
        ast.alloc_expr(Expr::UnresolvedDeclRef {
            namespace: None,
            name: first,
            ty: TypeSlot::unresolved(),
            range: first_range,
        })
    }
}

fn path_to_sign(ast: &mut Ast, segments: &[(String, crate::source::SourceRange)]) -> crate::ast::SignId {
    use crate::ast::TypeSign;
    let range = segments[0].1.join(&segments.last().unwrap().1);
    if segments.len() == 1 {
        ast.alloc_sign(TypeSign::BareIdent {
            name: segments[0].0.clone(),
            range,
        })
    } else {
        ast.alloc_sign(TypeSign::CompoundIdent {
            path: segments.iter().map(|(name, _)| name.clone()).collect(),
            args: Vec::new(),
            range,
        })
    }
}

/// `match expr '{' case* '}'`; `case ::= pattern ('where' expr)? brace-stmt`
/// (spec §4.D "Match"). Each case gets a synthetic `PatternBinding` decl to
/// own the variables its pattern introduces, mirroring `val`/`var` (spec §8
/// invariant: every pattern's variables point back to a binding decl).
fn parse_match_expr(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> ExprId {
    let match_tok = state.take().unwrap();
    let subject = parse_expr(state, ast, sink);

    if state.take_kind(&TokenKind::LBrace).is_none() {
        sink.report(Diagnostic::error("expected '{'", state.error_range()));
        state.has_error = true;
    }

    let case_space = ast.alloc_space(Some(state.space));
    let mut cases = Vec::new();
    while state.peek_kind() == Some(&TokenKind::Case) {
        cases.push(parse_match_case(state, ast, sink, case_space));
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

    let range = match_tok.range.join(&close_range);
    ast.alloc_expr(Expr::Match {
        subject,
        cases,
        ty: TypeSlot::unresolved(),
        range,
    })
}

fn parse_match_case(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
) -> MatchCaseData {
    let case_tok = state.take_kind(&TokenKind::Case);
    let start = case_tok.map(|t| t.range).unwrap_or_else(|| state.error_range());

    let placeholder = ast.alloc_pattern(Pattern::Wildcard { range: start });
    let owner = ast.alloc_decl(
        Decl::PatternBinding {
            is_var: false,
            pattern: placeholder,
            sign: None,
            init: None,
            modifiers: Modifiers::default(),
            space,
            ty: TypeSlot::unresolved(),
            range: start,
        },
        space,
    );
    let pattern = super::pattern::parse_pattern(state, ast, sink, owner);

    let guard = if state.take_kind(&TokenKind::Where).is_some() {
        Some(parse_expr(state, ast, sink))
    } else {
        None
    };

    let body = stmt::parse_brace_block(state, ast, sink, space);
    let range = start.join(&ast.stmt(body).range());

    ast.replace_decl(
        owner,
        Decl::PatternBinding {
            is_var: false,
            pattern,
            sign: None,
            init: None,
            modifiers: Modifiers::default(),
            space,
            ty: TypeSlot::unresolved(),
            range,
        },
    );

    MatchCaseData {
        pattern,
        guard,
        body,
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::VecSink;
    use crate::lex::Lexer;
    use crate::source::SourceManager;

    fn parse(text: &str) -> (Ast, ExprId, VecSink) {
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", text);
        let mut ast = Ast::new();
        let root = ast.alloc_root_space();
        let eof = sm.eof_range(file);
        let lexer = Lexer::new(file, sm.text(file));
        let mut state = State::new(lexer, root, eof);
        let mut sink = VecSink::new();
        let id = parse_expr(&mut state, &mut ast, &mut sink);
        (ast, id, sink)
    }

    #[test]
    fn precedence_multiplication_binds_tighter() {
        let (ast, id, sink) = parse("1 + 2 * 3");
        assert!(!sink.has_errors());
        match ast.expr(id) {
            Expr::InfixCall { op, rhs, .. } => {
                assert_eq!(op, "+");
                assert!(matches!(ast.expr(*rhs), Expr::InfixCall { op, .. } if op == "*"));
            }
            other => panic!("expected infix call, got {:?}", other),
        }
    }

    #[test]
    fn call_with_labeled_argument() {
        let (ast, id, sink) = parse("foo(label: 1, 2)");
        assert!(!sink.has_errors());
        match ast.expr(id) {
            Expr::Call { args, .. } => {
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].label.as_deref(), Some("label"));
                assert_eq!(args[1].label, None);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn member_and_call_chain() {
        let (ast, id, sink) = parse("a.b(1).c");
        assert!(!sink.has_errors());
        assert!(matches!(ast.expr(id), Expr::Member { .. }));
    }

    #[test]
    fn addr_of_prefix() {
        let (ast, id, sink) = parse("&x");
        assert!(!sink.has_errors());
        assert!(matches!(ast.expr(id), Expr::AddrOf { .. }));
    }

    #[test]
    fn prefix_requires_adjacency() {
        // A bare '-' with a gap before its "operand" can't be a prefix; it
        // falls through and `5` alone is the whole expression, leaving `-`
        // unconsumed (caller's problem, not this production's).
        let (ast, id, _) = parse("- 5");
        assert!(matches!(ast.expr(id), Expr::Error { .. }) || matches!(ast.expr(id), Expr::IntLit { .. }));
    }

    #[test]
    fn bare_qualified_decl_ref() {
        let (ast, id, sink) = parse("Namespace::member");
        assert!(!sink.has_errors());
        match ast.expr(id) {
            Expr::UnresolvedDeclRef { namespace, name, .. } => {
                assert!(namespace.is_some());
                assert_eq!(name, "member");
            }
            other => panic!("expected decl ref, got {:?}", other),
        }
    }

    #[test]
    fn trailing_double_colon_backtracks_to_bare_ident() {
        let (ast, id, sink) = parse("Foo::");
        assert!(!sink.has_errors());
        match ast.expr(id) {
            Expr::UnresolvedDeclRef { namespace, name, .. } => {
                assert!(namespace.is_none());
                assert_eq!(name, "Foo");
            }
            other => panic!("expected bare decl ref, got {:?}", other),
        }
    }

    #[test]
    fn cast_suffix() {
        let (ast, id, sink) = parse("x cast? Int");
        assert!(!sink.has_errors());
        assert!(matches!(ast.expr(id), Expr::DynCast { .. }));
    }

    #[test]
    fn grouping_parens_do_not_become_a_tuple() {
        let (ast, id, sink) = parse("(1)");
        assert!(!sink.has_errors());
        assert!(matches!(ast.expr(id), Expr::IntLit { .. }));
    }

    #[test]
    fn parenthesized_tuple() {
        let (ast, id, sink) = parse("(1, 2)");
        assert!(!sink.has_errors());
        match ast.expr(id) {
            Expr::Tuple { elements, .. } => assert_eq!(elements.len(), 2),
            other => panic!("expected tuple, got {:?}", other),
        }
    }
}
