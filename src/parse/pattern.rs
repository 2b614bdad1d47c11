//! Pattern parsing (spec §4.D): named/binding/tuple/wildcard. Named
//! patterns allocate the `Variable` declaration they bind, owned by
//! `owner` — the enclosing pattern-binding decl (spec §3, §8 invariant).

use super::{parse_list, take_name, State};
use crate::ast::{pattern::PatternElement, Ast, DeclId, Pattern, PatternId, Ranged};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::lex::TokenKind;

pub fn parse_pattern(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    owner: DeclId,
) -> PatternId {
    match state.peek_kind() {
        Some(TokenKind::Val) | Some(TokenKind::Var) => parse_binding_pattern(state, ast, sink, owner),
        Some(TokenKind::Under) => {
            let tok = state.take().unwrap();
            ast.alloc_pattern(Pattern::Wildcard { range: tok.range })
        }
        Some(TokenKind::LParen) => parse_tuple_pattern(state, ast, sink, owner),
        Some(TokenKind::Name(_)) => {
            let (name, range) = take_name(state).unwrap();
            let var_decl = ast.alloc_variable_decl(name, owner, range);
            ast.alloc_pattern(Pattern::Named { var_decl, range })
        }
        _ => {
            let range = state.error_range();
            sink.report(Diagnostic::error("expected a pattern", range));
            state.has_error = true;
            ast.alloc_pattern(Pattern::Wildcard { range })
        }
    }
}

fn parse_binding_pattern(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    owner: DeclId,
) -> PatternId {
    let kw = state.take().unwrap();
    let is_var = kw.kind == TokenKind::Var;
    let sub = parse_pattern(state, ast, sink, owner);

    let mut range = kw.range.join(&ast.pattern(sub).range());
    let sign = if state.take_kind(&TokenKind::Colon).is_some() {
        let sign = super::sign::parse_sign(state, ast, sink);
        range = range.join(&ast.sign(sign).range());
        Some(sign)
    } else {
        None
    };

    ast.alloc_pattern(Pattern::Binding {
        is_var,
        sub,
        sign,
        range,
    })
}

fn parse_tuple_pattern(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    owner: DeclId,
) -> PatternId {
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
                    let pattern = parse_pattern(state, ast, sink, owner);
                    return Some(PatternElement {
                        label: Some(label),
                        pattern,
                    });
                }
                state.restore(saved);
            }
            let pattern = parse_pattern(state, ast, sink, owner);
            Some(PatternElement {
                label: None,
                pattern,
            })
        },
    );
    ast.alloc_pattern(Pattern::Tuple { elements, range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Decl;
    use crate::diagnostic::VecSink;
    use crate::lex::Lexer;
    use crate::source::SourceManager;

    fn parse(text: &str) -> (Ast, PatternId, VecSink) {
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", text);
        let mut ast = Ast::new();
        let root = ast.alloc_root_space();
        let owner = ast.alloc_decl(
            Decl::GenericParameter {
                name: "<owner placeholder>".into(),
                space: root,
                range: sm.eof_range(file),
            },
            root,
        );
        let eof = sm.eof_range(file);
        let lexer = Lexer::new(file, sm.text(file));
        let mut state = State::new(lexer, root, eof);
        let mut sink = VecSink::new();
        let id = parse_pattern(&mut state, &mut ast, &mut sink, owner);
        (ast, id, sink)
    }

    #[test]
    fn named_pattern_allocates_a_variable() {
        let (ast, id, sink) = parse("x");
        assert!(!sink.has_errors());
        match ast.pattern(id) {
            Pattern::Named { var_decl, .. } => {
                assert!(matches!(ast.decl(*var_decl), Decl::Variable { name, .. } if name == "x"));
            }
            other => panic!("expected named pattern, got {:?}", other),
        }
    }

    #[test]
    fn binding_pattern_with_type() {
        let (ast, id, sink) = parse("val x: Int");
        assert!(!sink.has_errors());
        match ast.pattern(id) {
            Pattern::Binding { is_var, sign, .. } => {
                assert!(!is_var);
                assert!(sign.is_some());
            }
            other => panic!("expected binding pattern, got {:?}", other),
        }
    }

    #[test]
    fn tuple_pattern_with_labels() {
        let (ast, id, sink) = parse("(a: x, y)");
        assert!(!sink.has_errors());
        match ast.pattern(id) {
            Pattern::Tuple { elements, .. } => {
                assert_eq!(elements.len(), 2);
                assert_eq!(elements[0].label.as_deref(), Some("a"));
                assert_eq!(elements[1].label, None);
            }
            other => panic!("expected tuple pattern, got {:?}", other),
        }
    }

    #[test]
    fn wildcard_pattern() {
        let (ast, id, sink) = parse("_");
        assert!(!sink.has_errors());
        assert!(matches!(ast.pattern(id), Pattern::Wildcard { .. }));
    }
}
