//! Declaration parsing (spec §4.D "Declarations", "Operator functions",
//! "Function parameter", "Type decl", "Generic clause").

use super::{expr, pattern, sign, stmt, take_name, take_oper, parse_list, ParseError, PResult, State};
use crate::ast::decl::{GenericClause, OperatorKind, Param, RequirementKind, TypeRequirement};
use crate::ast::{Ast, Decl, DeclId, DeclSpaceId, Modifiers, Pattern, Ranged, TypeSlot};
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::lex::TokenKind;
use crate::source::SourceRange;

/// One declaration (spec §4.D "Declarations"): modifiers, then dispatch on
/// the keyword that follows.
pub fn parse_decl(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
) -> PResult<DeclId> {
    let start = state.error_range();
    let modifiers = parse_modifiers(state, sink);

    match state.peek_kind() {
        Some(TokenKind::Val) | Some(TokenKind::Var) => {
            parse_pattern_binding(state, ast, sink, space, modifiers, start)
        }
        Some(TokenKind::Fun) => parse_function(state, ast, sink, space, modifiers, start),
        Some(TokenKind::New) => parse_constructor(state, ast, sink, space, modifiers, start),
        Some(TokenKind::Del) => parse_destructor(state, ast, sink, space, start),
        Some(TokenKind::Type) => parse_type_decl(state, ast, sink, space, modifiers, start, false),
        Some(TokenKind::View) => parse_type_decl(state, ast, sink, space, modifiers, start, true),
        Some(TokenKind::Extn) => parse_extension(state, ast, sink, space, start),
        _ => Err(ParseError::new("expected a declaration", start)),
    }
}

/// `pub`/`mod`/`mut`/`infix`/`prefix`/`postfix`/`volatile`/`static`/
/// `moveonly`, with exclusivity and context-legality enforced as they're
/// read (spec §4.D "Declarations").
fn parse_modifiers(state: &mut State, sink: &mut dyn DiagnosticSink) -> Modifiers {
    let mut modifiers = Modifiers::default();
    loop {
        let range = state.error_range();
        match state.peek_kind() {
            Some(TokenKind::Pub) => {
                state.take();
                if modifiers.is_mod {
                    sink.report(Diagnostic::error("'pub' and 'mod' are mutually exclusive", range));
                }
                modifiers.is_pub = true;
            }
            Some(TokenKind::Mod) => {
                state.take();
                if modifiers.is_pub {
                    sink.report(Diagnostic::error("'pub' and 'mod' are mutually exclusive", range));
                }
                modifiers.is_mod = true;
            }
            Some(TokenKind::Mut) => {
                state.take();
                modifiers.is_mut = true;
            }
            Some(TokenKind::Infix) => {
                state.take();
                if modifiers.is_prefix || modifiers.is_postfix {
                    sink.report(Diagnostic::error(
                        "'infix'/'prefix'/'postfix' are mutually exclusive",
                        range,
                    ));
                }
                modifiers.is_infix = true;
            }
            Some(TokenKind::Prefix) => {
                state.take();
                if modifiers.is_infix || modifiers.is_postfix {
                    sink.report(Diagnostic::error(
                        "'infix'/'prefix'/'postfix' are mutually exclusive",
                        range,
                    ));
                }
                modifiers.is_prefix = true;
            }
            Some(TokenKind::Postfix) => {
                state.take();
                if modifiers.is_infix || modifiers.is_prefix {
                    sink.report(Diagnostic::error(
                        "'infix'/'prefix'/'postfix' are mutually exclusive",
                        range,
                    ));
                }
                modifiers.is_postfix = true;
            }
            Some(TokenKind::Volatile) => {
                state.take();
                modifiers.is_volatile = true;
            }
            Some(TokenKind::Static) => {
                state.take();
                if !(state.flags.parsing_prod_body || state.flags.parsing_view_body) {
                    sink.report(Diagnostic::error(
                        "'static' is only legal inside a type body",
                        range,
                    ));
                }
                modifiers.is_static = true;
            }
            Some(TokenKind::Moveonly) => {
                state.take();
                modifiers.is_moveonly = true;
            }
            _ => break,
        }
    }
    modifiers
}

fn operator_kind(modifiers: &Modifiers) -> Option<OperatorKind> {
    if modifiers.is_infix {
        Some(OperatorKind::Infix)
    } else if modifiers.is_prefix {
        Some(OperatorKind::Prefix)
    } else if modifiers.is_postfix {
        Some(OperatorKind::Postfix)
    } else {
        None
    }
}

/// `val`/`var` pattern (spec §3). The binding decl must exist before its
/// pattern can be parsed — the pattern's `Variable` leaves point back to it —
/// so a placeholder is allocated first and patched in place once the real
/// pattern and initializer are known.
fn parse_pattern_binding(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    modifiers: Modifiers,
    start: SourceRange,
) -> PResult<DeclId> {
    let kw = state.take().unwrap();
    let is_var = kw.kind == TokenKind::Var;

    let placeholder = ast.alloc_pattern(Pattern::Wildcard { range: kw.range });
    let id = ast.alloc_decl(
        Decl::PatternBinding {
            is_var,
            pattern: placeholder,
            sign: None,
            init: None,
            modifiers,
            space,
            ty: TypeSlot::unresolved(),
            range: kw.range,
        },
        space,
    );

    let pat = pattern::parse_pattern(state, ast, sink, id);

    let sign = if state.take_kind(&TokenKind::Colon).is_some() {
        Some(sign::parse_sign(state, ast, sink))
    } else {
        None
    };

    let init = if state.take_kind(&TokenKind::Assign).is_some() {
        Some(expr::parse_expr(state, ast, sink))
    } else {
        None
    };

    let mut range = start.join(&ast.pattern(pat).range());
    if let Some(sign) = sign {
        range = range.join(&ast.sign(sign).range());
    }
    if let Some(init) = init {
        range = range.join(&ast.expr(init).range());
    }

    ast.replace_decl(
        id,
        Decl::PatternBinding {
            is_var,
            pattern: pat,
            sign,
            init,
            modifiers,
            space,
            ty: TypeSlot::unresolved(),
            range,
        },
    );
    Ok(id)
}

/// `fun` (spec §4.D "Operator functions", "Function parameter"): an ordinary
/// name, or — when `infix`/`prefix`/`postfix` was read among the modifiers —
/// an operator token, subject to the arity constraints for each kind.
fn parse_function(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    modifiers: Modifiers,
    start: SourceRange,
) -> PResult<DeclId> {
    state.take(); // 'fun'
    let op_kind = operator_kind(&modifiers);

    let name = if op_kind.is_some() {
        if modifiers.is_static {
            sink.report(Diagnostic::error(
                "operator functions must be non-static members",
                start,
            ));
        }
        match state.take_operator(false) {
            Some((text, _)) => Some(text),
            None => {
                return Err(ParseError::new(
                    "expected an operator after 'infix'/'prefix'/'postfix'",
                    state.error_range(),
                ))
            }
        }
    } else {
        take_name(state).map(|(text, _)| text)
    };

    let generic_clause = parse_generic_clause(state, ast, sink, space);
    let (params, params_range) = parse_list(state, ast, sink, TokenKind::LParen, TokenKind::RParen, parse_param);

    if let Some(kind) = op_kind {
        let expected = match kind {
            OperatorKind::Infix => 1,
            OperatorKind::Prefix | OperatorKind::Postfix => 0,
        };
        if params.len() != expected {
            sink.report(Diagnostic::error(
                format!(
                    "{:?} operator functions take exactly {} parameter(s)",
                    kind, expected
                ),
                params_range,
            ));
        }
    }

    let output = if state.take_kind(&TokenKind::Arrow).is_some() {
        Some(sign::parse_sign(state, ast, sink))
    } else {
        None
    };

    let body_space = ast.alloc_space(Some(space));
    let body = parse_optional_body(state, ast, sink, body_space, |flags| {
        flags.parsing_fun_body = true;
    });

    let mut range = start.join(&params_range);
    if let Some(output) = output {
        range = range.join(&ast.sign(output).range());
    }
    if let Some(body) = body {
        range = range.join(&ast.stmt(body).range());
    }

    Ok(ast.alloc_decl(
        Decl::Function {
            name,
            operator_kind: op_kind,
            generic_clause,
            params,
            output,
            body,
            modifiers,
            space,
            body_space,
            ty: TypeSlot::unresolved(),
            range,
        },
        space,
    ))
}

fn parse_constructor(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    modifiers: Modifiers,
    start: SourceRange,
) -> PResult<DeclId> {
    state.take(); // 'new'
    let (params, params_range) = parse_list(state, ast, sink, TokenKind::LParen, TokenKind::RParen, parse_param);
    let body_space = ast.alloc_space(Some(space));
    let body = parse_optional_body(state, ast, sink, body_space, |flags| {
        flags.parsing_fun_body = true;
    });

    let mut range = start.join(&params_range);
    if let Some(body) = body {
        range = range.join(&ast.stmt(body).range());
    }

    Ok(ast.alloc_decl(
        Decl::Constructor {
            params,
            body,
            modifiers,
            space,
            body_space,
            ty: TypeSlot::unresolved(),
            range,
        },
        space,
    ))
}

fn parse_destructor(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    start: SourceRange,
) -> PResult<DeclId> {
    state.take(); // 'del'
    let body_space = ast.alloc_space(Some(space));
    let body = parse_optional_body(state, ast, sink, body_space, |flags| {
        flags.parsing_fun_body = true;
    });

    let range = match body {
        Some(body) => start.join(&ast.stmt(body).range()),
        None => start,
    };

    Ok(ast.alloc_decl(
        Decl::Destructor {
            body,
            space,
            body_space,
            ty: TypeSlot::unresolved(),
            range,
        },
        space,
    ))
}

/// A brace block if one follows immediately; otherwise `None` (a forward
/// declaration / requirement signature with no body).
fn parse_optional_body(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    body_space: DeclSpaceId,
    set_flag: impl FnOnce(&mut super::Flags),
) -> Option<crate::ast::StmtId> {
    if state.peek_kind() != Some(&TokenKind::LBrace) {
        return None;
    }
    let saved_flags = state.flags;
    state.flags.parsing_top_level = false;
    set_flag(&mut state.flags);
    let body = stmt::parse_brace_block(state, ast, sink, body_space);
    state.flags = saved_flags;
    Some(body)
}

fn parse_param(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> Option<Param> {
    if state.peek().is_none() || state.peek_kind() == Some(&TokenKind::RParen) {
        return None;
    }

    let (label, name, start) = if let Some(under) = state.take_kind(&TokenKind::Under) {
        match take_name(state) {
            Some((name, range)) => (None, name, under.range.join(&range)),
            None => {
                sink.report(Diagnostic::error(
                    "expected a parameter name after '_'",
                    state.error_range(),
                ));
                (None, String::new(), under.range)
            }
        }
    } else {
        match take_name(state) {
            Some((first, first_range)) => {
                if state.peek_is_name() {
                    let (second, second_range) = take_name(state).unwrap();
                    if first == second {
                        sink.report(Diagnostic::warning(
                            "identical external and internal parameter name",
                            first_range.join(&second_range),
                        ));
                    }
                    (Some(first), second, first_range.join(&second_range))
                } else {
                    (Some(first.clone()), first, first_range)
                }
            }
            None => {
                sink.report(Diagnostic::error("expected a parameter", state.error_range()));
                return None;
            }
        }
    };

    let sign = if state.take_kind(&TokenKind::Colon).is_some() {
        sign::parse_sign(state, ast, sink)
    } else {
        sink.report(Diagnostic::error("expected ':' in parameter", state.error_range()));
        ast.alloc_sign(crate::ast::TypeSign::Error {
            range: state.error_range(),
        })
    };

    let range = start.join(&ast.sign(sign).range());
    Some(Param {
        label,
        name,
        sign,
        range,
    })
}

/// `<` comma-separated parameter names, optional `where` requirement list,
/// `>` (spec §4.D "Generic clause"). Parameters are registered into `space`
/// so they're visible to the declaration's own signature and body.
fn parse_generic_clause(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
) -> Option<GenericClause> {
    if state.peek_kind() != Some(&TokenKind::LAngle) {
        return None;
    }
    state.take();

    let mut params = Vec::new();
    loop {
        match take_name(state) {
            Some((name, range)) => {
                params.push(ast.alloc_decl(
                    Decl::GenericParameter { name, space, range },
                    space,
                ));
            }
            None => break,
        }
        if state.take_kind(&TokenKind::Comma).is_none() {
            break;
        }
    }

    let requirements = if state.take_kind(&TokenKind::Where).is_some() {
        parse_requirements(state, ast, sink)
    } else {
        Vec::new()
    };

    if state.take_kind(&TokenKind::RAngle).is_none() {
        sink.report(Diagnostic::error("expected '>'", state.error_range()));
    }

    Some(GenericClause { params, requirements })
}

/// `compound-ident-sign ('==' | ':') sign`, comma-separated (spec §4.D
/// "Generic clause": "A type requirement is ...").
fn parse_requirements(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
) -> Vec<TypeRequirement> {
    let mut requirements = Vec::new();
    loop {
        let subject = sign::parse_sign(state, ast, sink);
        let kind = if take_oper(state, "==").is_some() {
            RequirementKind::Equality
        } else if state.take_kind(&TokenKind::Colon).is_some() {
            RequirementKind::Conformance
        } else {
            sink.report(Diagnostic::error(
                "expected '==' or ':' in type requirement",
                state.error_range(),
            ));
            RequirementKind::Conformance
        };
        let target = sign::parse_sign(state, ast, sink);
        let range = ast.sign(subject).range().join(&ast.sign(target).range());
        requirements.push(TypeRequirement {
            subject,
            kind,
            target,
            range,
        });
        if state.take_kind(&TokenKind::Comma).is_none() {
            break;
        }
    }
    requirements
}

/// `: sign (',' sign)*`, the inheritance/conformance list on a type head.
fn parse_inheritance_list(state: &mut State, ast: &mut Ast, sink: &mut dyn DiagnosticSink) -> Vec<crate::ast::SignId> {
    if state.take_kind(&TokenKind::Colon).is_none() {
        return Vec::new();
    }
    let mut signs = vec![sign::parse_sign(state, ast, sink)];
    while state.take_kind(&TokenKind::Comma).is_some() {
        signs.push(sign::parse_sign(state, ast, sink));
    }
    signs
}

/// `(type|view) NAME genericClause? inheritanceList?` then dispatch on what
/// follows (spec §4.D "Type decl").
fn parse_type_decl(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    modifiers: Modifiers,
    start: SourceRange,
    is_view: bool,
) -> PResult<DeclId> {
    state.take(); // 'type' or 'view'
    let (name, _) = take_name(state).ok_or_else(|| ParseError::new("expected a type name", state.error_range()))?;

    let body_space = ast.alloc_space(Some(space));
    let generic_clause = parse_generic_clause(state, ast, sink, body_space);
    if is_view {
        if let Some(clause) = &generic_clause {
            if !clause.params.is_empty() {
                sink.report(Diagnostic::error(
                    "views forbid generic clauses: their associated types are abstract members",
                    start,
                ));
            }
        }
    }
    let inherits = parse_inheritance_list(state, ast, sink);

    match state.peek_kind() {
        Some(TokenKind::LBrace) => parse_type_body(state, ast, sink, space, body_space, modifiers, name, generic_clause, inherits, start, is_view),
        Some(TokenKind::Assign) => {
            state.take();
            let target = sign::parse_sign(state, ast, sink);
            let range = start.join(&ast.sign(target).range());
            if is_view {
                sink.report(Diagnostic::error("views cannot be type aliases", start));
            }
            Ok(ast.alloc_decl(
                Decl::AliasType {
                    name,
                    generic_clause,
                    target,
                    modifiers,
                    space,
                    range,
                },
                space,
            ))
        }
        Some(TokenKind::Where) => {
            state.take();
            let requirements = parse_requirements(state, ast, sink);
            if !is_view {
                sink.report(Diagnostic::error(
                    "abstract types are only legal inside a view body",
                    start,
                ));
            }
            let conformances: Vec<_> = requirements
                .iter()
                .filter(|r| r.kind == RequirementKind::Conformance)
                .map(|r| r.target)
                .collect();
            let range = start;
            Ok(ast.alloc_decl(
                Decl::AbstractType {
                    name,
                    conformances,
                    space,
                    range,
                },
                space,
            ))
        }
        _ => Err(ParseError::new(
            "expected '{', '=', or 'where' after a type head",
            state.error_range(),
        )),
    }
}

fn parse_type_body(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    body_space: DeclSpaceId,
    modifiers: Modifiers,
    name: String,
    generic_clause: Option<GenericClause>,
    inherits: Vec<crate::ast::SignId>,
    start: SourceRange,
    is_view: bool,
) -> PResult<DeclId> {
    let open = state.take_kind(&TokenKind::LBrace).unwrap();
    let saved_flags = state.flags;
    state.flags.parsing_top_level = false;
    if is_view {
        state.flags.parsing_view_body = true;
    } else {
        state.flags.parsing_prod_body = true;
    }

    let mut members = Vec::new();
    loop {
        state.skip_while(|k| *k == TokenKind::Semi);
        if state.peek_kind() == Some(&TokenKind::RBrace) || state.peek().is_none() {
            break;
        }
        match parse_decl(state, ast, sink, body_space) {
            Ok(id) => {
                if is_view && !matches!(ast.decl(id), Decl::AbstractType { .. } | Decl::Function { .. }) {
                    sink.report(Diagnostic::error(
                        "view bodies forbid nested non-abstract types",
                        ast.decl(id).range(),
                    ));
                }
                if !is_view && matches!(ast.decl(id), Decl::AbstractType { .. }) {
                    sink.report(Diagnostic::error(
                        "product-type bodies forbid abstract types",
                        ast.decl(id).range(),
                    ));
                }
                members.push(id);
            }
            Err(err) => {
                sink.report(Diagnostic::error(err.message, err.range));
                state.has_error = true;
                super::recover_to_next_decl(state);
            }
        }
    }

    let close_range = state
        .take_kind(&TokenKind::RBrace)
        .map(|t| t.range)
        .unwrap_or_else(|| {
            sink.report(Diagnostic::error("expected '}'", state.error_range()));
            state.has_error = true;
            state.error_range()
        });
    state.flags = saved_flags;

    let range = start.join(&open.range).join(&close_range);
    let id = if is_view {
        ast.alloc_decl(
            Decl::ViewType {
                name,
                requirements: members,
                inherits,
                modifiers,
                space,
                body_space,
                range,
            },
            space,
        )
    } else {
        ast.alloc_decl(
            Decl::ProductType {
                name,
                generic_clause,
                inherits,
                members,
                modifiers,
                space,
                body_space,
                range,
            },
            space,
        )
    };
    Ok(id)
}

/// `extn sign { members }` (spec §4.D "Declarations": "Views and extensions
/// must appear at top level").
fn parse_extension(
    state: &mut State,
    ast: &mut Ast,
    sink: &mut dyn DiagnosticSink,
    space: DeclSpaceId,
    start: SourceRange,
) -> PResult<DeclId> {
    state.take(); // 'extn'
    if !state.flags.parsing_top_level {
        sink.report(Diagnostic::error("extensions must appear at top level", start));
    }
    let target = sign::parse_sign(state, ast, sink);
    let body_space = ast.alloc_space(Some(space));

    let open = state
        .take_kind(&TokenKind::LBrace)
        .ok_or_else(|| ParseError::new("expected '{' to open an extension body", state.error_range()))?;

    let saved_flags = state.flags;
    state.flags.parsing_top_level = false;
    state.flags.parsing_extn_body = true;
    let mut members = Vec::new();
    loop {
        state.skip_while(|k| *k == TokenKind::Semi);
        if state.peek_kind() == Some(&TokenKind::RBrace) || state.peek().is_none() {
            break;
        }
        match parse_decl(state, ast, sink, body_space) {
            Ok(id) => members.push(id),
            Err(err) => {
                sink.report(Diagnostic::error(err.message, err.range));
                state.has_error = true;
                super::recover_to_next_decl(state);
            }
        }
    }
    let close_range = state
        .take_kind(&TokenKind::RBrace)
        .map(|t| t.range)
        .unwrap_or_else(|| {
            sink.report(Diagnostic::error("expected '}'", state.error_range()));
            state.has_error = true;
            state.error_range()
        });
    state.flags = saved_flags;

    let range = start.join(&open.range).join(&close_range);
    Ok(ast.alloc_decl(
        Decl::Extension {
            target,
            members,
            space,
            body_space,
            range,
        },
        space,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::VecSink;
    use crate::lex::Lexer;
    use crate::source::SourceManager;

    fn parse(text: &str) -> (Ast, PResult<DeclId>, VecSink) {
        let mut sm = SourceManager::new();
        let file = sm.load_synthesized("<test>", text);
        let mut ast = Ast::new();
        let root = ast.alloc_root_space();
        let eof = sm.eof_range(file);
        let lexer = Lexer::new(file, sm.text(file));
        let mut state = State::new(lexer, root, eof);
        state.flags.parsing_top_level = true;
        let mut sink = VecSink::new();
        let result = parse_decl(&mut state, &mut ast, &mut sink, root);
        (ast, result, sink)
    }

    #[test]
    fn function_with_params_and_output() {
        let (ast, result, sink) = parse("fun add(a: Int, b: Int) -> Int { ret a + b; }");
        assert!(!sink.has_errors());
        let id = result.expect("should parse");
        match ast.decl(id) {
            Decl::Function {
                name,
                params,
                output,
                body,
                ..
            } => {
                assert_eq!(name.as_deref(), Some("add"));
                assert_eq!(params.len(), 2);
                assert!(output.is_some());
                assert!(body.is_some());
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn infix_operator_function_requires_one_param() {
        let (_, result, sink) = parse("infix fun +(other: Self) { }");
        result.expect("should parse");
        assert!(!sink.has_errors());
    }

    #[test]
    fn infix_operator_function_wrong_arity_is_diagnosed() {
        let (_, result, sink) = parse("infix fun +() { }");
        result.expect("should parse");
        assert!(sink.has_errors());
    }

    #[test]
    fn product_type_with_member() {
        let (ast, result, sink) = parse("type Point { val x: Int; val y: Int; }");
        assert!(!sink.has_errors());
        let id = result.expect("should parse");
        match ast.decl(id) {
            Decl::ProductType { name, members, .. } => {
                assert_eq!(name, "Point");
                assert_eq!(members.len(), 2);
            }
            other => panic!("expected product type, got {:?}", other),
        }
    }

    #[test]
    fn view_forbids_nested_product_type() {
        let (_, result, sink) = parse("view Drawable { type Bogus { } }");
        result.expect("should still parse despite the diagnostic");
        assert!(sink.has_errors());
    }

    #[test]
    fn alias_type() {
        let (ast, result, sink) = parse("type Id = Int;");
        assert!(!sink.has_errors());
        let id = result.expect("should parse");
        assert!(matches!(ast.decl(id), Decl::AliasType { .. }));
    }

    #[test]
    fn pub_and_mod_are_mutually_exclusive() {
        let (_, result, sink) = parse("pub mod val x: Int = 1;");
        result.expect("should still parse despite the diagnostic");
        assert!(sink.has_errors());
    }

    #[test]
    fn extension_outside_top_level_is_diagnosed() {
        let (_, _, sink) = parse("type T { extn T { } }");
        assert!(sink.has_errors());
    }
}
