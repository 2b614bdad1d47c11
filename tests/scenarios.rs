//! End-to-end coverage of spec.md §8's numbered scenarios, driven through
//! the crate's public API rather than internal unit tests.

use hyloc_core::ast::{Decl, Expr, Pattern, TypeSign};
use hyloc_core::diagnostic::VecSink;
use hyloc_core::ir::{
    CanonicalSpecialization, FunctionOrigin, GenericParamId, Instruction, Linkage, LoweredType,
    Module, Operand, ParameterConvention, ParameterType,
};
use hyloc_core::lex::{Lexer, TokenKind};
use hyloc_core::mono::{monomorphize_function, NoConformances};
use hyloc_core::source::SourceManager;
use hyloc_core::{parse_source_unit, ParserConfig};

fn parse(text: &str) -> (hyloc_core::ParsedUnit, VecSink) {
    let mut sources = SourceManager::new();
    let file = sources.load_synthesized("<scenario>", text);
    let mut sink = VecSink::new();
    let unit = parse_source_unit(&sources, file, ParserConfig::default(), &mut sink);
    (unit, sink)
}

/// Scenario 1: lexing `"Salut"` yields one string token spanning the quoted
/// range.
#[test]
fn scenario_1_lex_single_string_token() {
    let mut sources = SourceManager::new();
    let file = sources.load_synthesized("<scenario-1>", "\"Salut\"");
    let mut lexer = Lexer::new(file, sources.text(file));

    let token = lexer.next_token().expect("one token");
    assert_eq!(token.kind, TokenKind::Str("Salut".to_string()));
    assert_eq!(sources.range_text(token.range), "\"Salut\"");
    assert!(lexer.next_token().is_none());
}

/// Scenario 2: `val x: Int = 42` parses to a pattern-binding decl with a
/// named pattern "x", a bare-ident signature "Int", and an int-literal
/// initializer 42, with no error.
#[test]
fn scenario_2_parse_pattern_binding() {
    let (unit, sink) = parse("val x: Int = 42");
    assert!(!unit.has_error);
    assert!(!sink.has_errors());

    let decls = &unit.ast.space(unit.root).decls;
    assert_eq!(decls.len(), 1);
    match unit.ast.decl(decls[0]) {
        Decl::PatternBinding {
            is_var,
            pattern,
            sign,
            init,
            ..
        } => {
            assert!(!is_var);
            match unit.ast.pattern(*pattern) {
                Pattern::Named { var_decl, .. } => match unit.ast.decl(*var_decl) {
                    Decl::Variable { name, .. } => assert_eq!(name, "x"),
                    other => panic!("expected a variable decl, got {:?}", other),
                },
                other => panic!("expected a named pattern, got {:?}", other),
            }
            match unit.ast.sign(sign.expect("signature present")) {
                TypeSign::BareIdent { name, .. } => assert_eq!(name, "Int"),
                other => panic!("expected a bare-ident signature, got {:?}", other),
            }
            match unit.ast.expr(init.expect("initializer present")) {
                Expr::IntLit { text, .. } => assert_eq!(text, "42"),
                other => panic!("expected an int literal, got {:?}", other),
            }
        }
        other => panic!("expected a pattern binding, got {:?}", other),
    }
}

/// Scenario 3: `1 + 2 * 3` parses with `*` binding tighter than `+`, giving
/// `(+ 1 (* 2 3))`.
#[test]
fn scenario_3_precedence_multiplication_binds_tighter() {
    let (unit, sink) = parse("val r = 1 + 2 * 3");
    assert!(!sink.has_errors());

    let decls = &unit.ast.space(unit.root).decls;
    let init = match unit.ast.decl(decls[0]) {
        Decl::PatternBinding { init, .. } => init.expect("initializer present"),
        other => panic!("expected a pattern binding, got {:?}", other),
    };
    match unit.ast.expr(init) {
        Expr::InfixCall { op, rhs, .. } => {
            assert_eq!(op, "+");
            match unit.ast.expr(*rhs) {
                Expr::InfixCall { op, .. } => assert_eq!(op, "*"),
                other => panic!("expected the right operand to be a '*' call, got {:?}", other),
            }
        }
        other => panic!("expected an infix call, got {:?}", other),
    }
}

/// Scenario 4: a malformed parameter list still recovers to a function
/// declaration named `f` instead of aborting the whole parse, with
/// `has_error` set and at least one diagnostic raised (spec §7 "always
/// best-effort AST, never a bare failure").
#[test]
fn scenario_4_parse_error_recovery_still_yields_a_function_decl() {
    let (unit, sink) = parse("fun f( -> Int { ret 1 }");
    assert!(unit.has_error);
    assert!(sink.has_errors());

    let decls = &unit.ast.space(unit.root).decls;
    assert_eq!(decls.len(), 1);
    match unit.ast.decl(decls[0]) {
        Decl::Function { name, .. } => assert_eq!(name.as_deref(), Some("f")),
        other => panic!("expected a function decl, got {:?}", other),
    }
}

/// Scenario 5: `type Pair<A, B where A: Eq> {}` (spec §4.D's generic-clause
/// grammar: the `where` clause sits inside the angle brackets) parses to a
/// product-type decl with two generic params and one conformance
/// requirement on `A`.
#[test]
fn scenario_5_generic_clause_with_requirements() {
    let (unit, sink) = parse("type Pair<A, B where A: Eq> {}");
    assert!(!unit.has_error);
    assert!(!sink.has_errors());

    let decls = &unit.ast.space(unit.root).decls;
    assert_eq!(decls.len(), 1);
    match unit.ast.decl(decls[0]) {
        Decl::ProductType {
            name, generic_clause, ..
        } => {
            assert_eq!(name, "Pair");
            let clause = generic_clause.as_ref().expect("generic clause present");
            assert_eq!(clause.params.len(), 2);
            assert_eq!(clause.requirements.len(), 1);
            let requirement = &clause.requirements[0];
            match unit.ast.sign(requirement.subject) {
                TypeSign::BareIdent { name, .. } => assert_eq!(name, "A"),
                other => panic!("expected a bare-ident requirement subject, got {:?}", other),
            }
            match unit.ast.sign(requirement.target) {
                TypeSign::BareIdent { name, .. } => assert_eq!(name, "Eq"),
                other => panic!("expected a bare-ident requirement target, got {:?}", other),
            }
        }
        other => panic!("expected a product-type decl, got {:?}", other),
    }
}

fn dummy_range() -> hyloc_core::source::SourceRange {
    let mut sources = SourceManager::new();
    let file = sources.load_synthesized("<scenario-6>", "");
    sources.eof_range(file)
}

fn declare_generic_identity(module: &mut Module) -> hyloc_core::ir::FunctionId {
    let param = GenericParamId(0);
    let id = module.declare_function(
        "id".to_string(),
        dummy_range(),
        Linkage::External,
        vec![ParameterType {
            convention: ParameterConvention::Sink,
            ty: LoweredType::GenericParam(param),
        }],
        LoweredType::GenericParam(param),
        vec![param],
        FunctionOrigin::LoweredDecl,
    );
    let function = module.function_mut(id);
    let entry = function.append_block(vec![LoweredType::GenericParam(param)]);
    function.block_mut(entry).push(Instruction::Return {
        value: Operand::Parameter { block: entry, index: 0 },
        range: dummy_range(),
    });
    id
}

/// Scenario 6: monomorphizing `id<T>(x: T) -> T` for `T := Int` produces a
/// non-generic function with input/output `Int` and the same block count as
/// the source; a repeat call with the same specialization returns the same
/// identity (monomorphization memoization).
#[test]
fn scenario_6_monomorphize_generic_identity() {
    let mut module = Module::new();
    let base = declare_generic_identity(&mut module);
    let specialization = CanonicalSpecialization {
        args: vec![(GenericParamId(0), LoweredType::Concrete("Int".to_string()))],
    };

    let first = monomorphize_function(&mut module, base, &specialization, &NoConformances);
    let target = module.function(first);
    assert!(!target.is_generic());
    assert_eq!(target.output, LoweredType::Concrete("Int".to_string()));
    assert_eq!(target.inputs[0].ty, LoweredType::Concrete("Int".to_string()));
    assert_eq!(target.block_count(), module.function(base).block_count());

    let second = monomorphize_function(&mut module, base, &specialization, &NoConformances);
    assert_eq!(first, second);
}
