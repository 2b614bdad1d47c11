//! Type signature parsing (spec §4.D): `sign ::= ('mut'|'volatile')*
//! async-sign ('->' sign)?`; `maxterm` (`|`-disjunction), `minterm`
//! (`&`-conjunction), `primary` (compound-ident or tuple).

use super::{parse_list, take_name, take_oper, State};
use crate::ast::{sign::TupleSignElement, Ast, Ranged, SignId, TypeSign};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::lex::TokenKind;

pub fn parse_sign(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    let start = state.error_range();

    let mut is_mut = false;
    let mut is_volatile = false;
    loop {
        if state.take_kind(&TokenKind::Mut).is_some() {
            is_mut = true;
        } else if state.take_kind(&TokenKind::Volatile).is_some() {
            is_volatile = true;
        } else {
            break;
        }
    }

    let is_async = state.take_kind(&TokenKind::Async).is_some();
    let body = parse_maxterm(state, ast, sink);
    let base = if is_async {
        let range = start.join(&ast.sign(body).range());
        ast.alloc_sign(TypeSign::Async { inner: body, range })
    } else {
        body
    };

    let result = if state.take_kind(&TokenKind::Arrow).is_some() {
        let output = parse_sign(state, ast, sink);
        let range = ast.sign(base).range().join(&ast.sign(output).range());
        ast.alloc_sign(TypeSign::Function {
            param: base,
            output,
            is_volatile,
            range,
        })
    } else {
        if is_volatile {
            sink.report(Diagnostic::error(
                "'volatile' is only legal on function signatures",
                start,
            ));
        }
        base
    };

    if is_mut {
        let range = start.join(&ast.sign(result).range());
        ast.alloc_sign(TypeSign::Inout {
            inner: result,
            range,
        })
    } else {
        result
    }
}

fn parse_maxterm(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    let first = parse_minterm(state, ast, sink);
    if take_oper(state, "|").is_none() {
        return first;
    }
    let mut members = vec![first];
    loop {
        members.push(parse_minterm(state, ast, sink));
        if take_oper(state, "|").is_none() {
            break;
        }
    }
    let range = ast
        .sign(members[0])
        .range()
        .join(&ast.sign(*members.last().unwrap()).range());
    ast.alloc_sign(TypeSign::Union { members, range })
}

fn parse_minterm(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    let first = parse_primary(state, ast, sink);
    if take_oper(state, "&").is_none() {
        return first;
    }
    let mut members = vec![first];
    loop {
        members.push(parse_primary(state, ast, sink));
        if take_oper(state, "&").is_none() {
            break;
        }
    }
    let range = ast
        .sign(members[0])
        .range()
        .join(&ast.sign(*members.last().unwrap()).range());
    ast.alloc_sign(TypeSign::ViewComposition { members, range })
}

fn parse_primary(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    match state.peek_kind() {
        Some(TokenKind::LParen) => parse_tuple_sign(state, ast, sink),
        Some(TokenKind::Name(_)) => parse_compound_ident(state, ast, sink),
        _ => {
            let range = state.error_range();
            sink.report(Diagnostic::error("expected a type signature", range));
            state.has_error = true;
            ast.alloc_sign(TypeSign::Error { range })
        }
    }
}

/// A `::`-separated path; only the final component may carry a `<...>`
/// generic-argument list (spec §4.D).
fn parse_compound_ident(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    let (first, start_range) = take_name(state).unwrap();
    let mut path = vec![first];
    let mut last_range = start_range;

    while state.take_kind(&TokenKind::TwoColons).is_some() {
        match take_name(state) {
            Some((name, range)) => {
                path.push(name);
                last_range = range;
            }
            None => {
                sink.report(Diagnostic::error(
                    "expected a name after '::'",
                    state.error_range(),
                ));
                state.has_error = true;
                break;
            }
        }
    }

    let mut args = Vec::new();
    if state.peek_kind() == Some(&TokenKind::LAngle) {
        let (parsed_args, args_range) = parse_generic_args(state, ast, sink);
        args = parsed_args;
        last_range = args_range;
    }

    let range = start_range.join(&last_range);
    if path.len() == 1 {
        let name = path.pop().unwrap();
        if args.is_empty() {
            ast.alloc_sign(TypeSign::BareIdent { name, range })
        } else {
            ast.alloc_sign(TypeSign::SpecializedIdent { name, args, range })
        }
    } else {
        ast.alloc_sign(TypeSign::CompoundIdent { path, args, range })
    }
}

/// `<` sign (',' sign)* `>`. The lexer always emits `lAngle`/`rAngle` as
/// single-character tokens, so nested generics (`Foo<Bar<T>>`) need no
/// special-casing here: the two trailing `>` are just two `rAngle` tokens.
fn parse_generic_args(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> (Vec<SignId>, crate::source::SourceRange) {
    parse_list(
        state,
        ast,
        sink,
        TokenKind::LAngle,
        TokenKind::RAngle,
        |state, ast, sink| Some(parse_sign(state, ast, sink)),
    )
}

fn parse_tuple_sign(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> SignId {
    let (elements, range) = parse_list(
        state,
        ast,
        sink,
        TokenKind::LParen,
        TokenKind::RParen,
        |state, ast, sink| {
            if state.peek().is_none() {
                return None;
            }
            let saved = state.save();
            if let Some((label, _)) = take_name(state) {
                if state.take_kind(&TokenKind::Colon).is_some() {
                    let sign = parse_sign(state, ast, sink);
                    return Some(TupleSignElement {
                        label: Some(label),
                        sign,
                    });
                }
                state.restore(saved);
            }
            let sign = parse_sign(state, ast, sink);
            Some(TupleSignElement { label: None, sign })
        },
    );
    ast.alloc_sign(TypeSign::Tuple { elements, range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::VecSink;
    use crate::lex::Lexer;
    use crate::source::SourceManager;

    fn parse(text: &str) -> (Ast, SignId, VecSink) {
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", text);
        let root_ast_space = Ast::new();
        let mut ast = root_ast_space;
        let root = ast.alloc_root_space();
        let eof = sm.eof_range(file);
        let lexer = Lexer::new(file, sm.text(file));
        let mut state = State::new(lexer, root, eof);
        let mut sink = VecSink::new();
        let id = parse_sign(&mut state, &mut ast, &mut sink);
        (ast, id, sink)
    }

    #[test]
    fn bare_ident() {
        let (ast, id, sink) = parse("Int");
        assert!(!sink.has_errors());
        assert!(matches!(ast.sign(id), TypeSign::BareIdent { name, .. } if name == "Int"));
    }

    #[test]
    fn specialized_ident() {
        let (ast, id, sink) = parse("Array<Int>");
        assert!(!sink.has_errors());
        match ast.sign(id) {
            TypeSign::SpecializedIdent { name, args, .. } => {
                assert_eq!(name, "Array");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected specialized ident, got {:?}", other),
        }
    }

    #[test]
    fn nested_generics_without_angle_gluing() {
        let (ast, id, sink) = parse("Array<Array<Int>>");
        assert!(!sink.has_errors());
        match ast.sign(id) {
            TypeSign::SpecializedIdent { args, .. } => {
                assert!(matches!(ast.sign(args[0]), TypeSign::SpecializedIdent { .. }));
            }
            other => panic!("expected specialized ident, got {:?}", other),
        }
    }

    #[test]
    fn union_and_composition() {
        let (ast, id, _) = parse("A | B & C");
        // `&` (minterm) binds tighter than `|` (maxterm): A | (B & C)
        match ast.sign(id) {
            TypeSign::Union { members, .. } => {
                assert_eq!(members.len(), 2);
                assert!(matches!(ast.sign(members[1]), TypeSign::ViewComposition { .. }));
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn function_sign_is_right_recursive() {
        let (ast, id, _) = parse("Int -> Int -> Bool");
        match ast.sign(id) {
            TypeSign::Function { output, .. } => {
                assert!(matches!(ast.sign(*output), TypeSign::Function { .. }));
            }
            other => panic!("expected function sign, got {:?}", other),
        }
    }

    #[test]
    fn mut_wraps_as_inout() {
        let (ast, id, _) = parse("mut Int");
        assert!(matches!(ast.sign(id), TypeSign::Inout { .. }));
    }

    #[test]
    fn volatile_without_arrow_is_diagnosed() {
        let (_, _, sink) = parse("volatile Int");
        assert!(sink.has_errors());
    }
}
